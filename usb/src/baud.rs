use crate::commands::CH341_CLKRATE;
use crate::error::BaudError;

/// Clock dividers selectable by the prescaler, indexed by their position.
const DIVIDERS: [u32; 5] = [1024, 128, 16, 2, 1];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaudRegisters {
    pub prescaler: u8,
    pub divisor: u8,
    pub actual_baud_rate: f64,

    /// |actual - target| / target
    pub relative_error: f64,
}

impl BaudRegisters {
    pub fn error_percent(&self) -> f64 {
        self.relative_error * 100.0
    }
}

/// A divider / count pair which fits in the chip's registers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaudCandidate {
    pub index: usize,
    pub count: u8,
    pub actual_baud_rate: f64,
    pub relative_error: f64,
}

pub fn candidates(target: u32) -> impl Iterator<Item = BaudCandidate> {
    DIVIDERS
        .iter()
        .enumerate()
        .filter_map(move |(index, &divider)| {
            let target = target as f64;
            let divided = CH341_CLKRATE as f64 / divider as f64;
            let n = (divided / target + 0.5).floor();
            let count = 256.0 - n;

            // 255 is reserved by the chip, so the count is limited to 0..=254
            if !(0.0..=254.0).contains(&count) {
                return None;
            }

            let actual_baud_rate = divided / n;
            Some(BaudCandidate {
                index,
                count: count as u8,
                actual_baud_rate,
                relative_error: (actual_baud_rate - target).abs() / target,
            })
        })
}

/// Finds the prescaler and divisor giving the smallest error for the requested rate. On a tie
/// the slower divider is kept.
pub fn calculate_baud_registers(target: u32) -> Result<BaudRegisters, BaudError> {
    if target == 0 {
        return Err(BaudError::Unsolvable { target });
    }

    let mut best: Option<BaudCandidate> = None;
    for candidate in candidates(target) {
        if best.is_none_or(|best| candidate.relative_error < best.relative_error) {
            best = Some(candidate);
        }
    }

    let best = best.ok_or(BaudError::Unsolvable { target })?;
    Ok(BaudRegisters {
        prescaler: prescaler_code(best.index),
        divisor: best.count,
        actual_baud_rate: best.actual_baud_rate,
        relative_error: best.relative_error,
    })
}

fn prescaler_code(index: usize) -> u8 {
    match index {
        // The undivided clock doesn't follow on from the others.
        4 => 7,
        index => index as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn common_rates() {
        let regs = calculate_baud_registers(9600).unwrap();
        assert_eq!((regs.prescaler, regs.divisor), (2, 178));
        assert!((regs.actual_baud_rate - 750_000.0 / 78.0).abs() < 1e-9);
        assert!(regs.error_percent() < 5.0);

        let regs = calculate_baud_registers(115_200).unwrap();
        assert_eq!((regs.prescaler, regs.divisor), (3, 204));
        assert!(regs.error_percent() < 5.0);
    }

    #[test]
    fn slow_rates_use_large_dividers() {
        let regs = calculate_baud_registers(1200).unwrap();
        assert_eq!((regs.prescaler, regs.divisor), (1, 178));

        let regs = calculate_baud_registers(300).unwrap();
        assert_eq!((regs.prescaler, regs.divisor), (0, 217));
    }

    #[test]
    fn undivided_clock_uses_code_seven() {
        let regs = calculate_baud_registers(6_000_000).unwrap();
        assert_eq!((regs.prescaler, regs.divisor), (7, 254));
        assert_eq!(regs.relative_error, 0.0);
    }

    #[test]
    fn tie_keeps_slower_divider() {
        // 1M is exact with both /2 (N = 6) and /1 (N = 12)
        let regs = calculate_baud_registers(1_000_000).unwrap();
        assert_eq!((regs.prescaler, regs.divisor), (3, 250));
    }

    #[test]
    fn unreachable_rates() {
        for target in [0, 10, 45, 8_000_001, 9_000_000, u32::MAX] {
            assert_eq!(
                calculate_baud_registers(target),
                Err(BaudError::Unsolvable { target })
            );
        }
    }

    #[test]
    fn zero_is_unsolvable() {
        assert_eq!(
            calculate_baud_registers(0),
            Err(BaudError::Unsolvable { target: 0 })
        );
        assert_eq!(candidates(0).count(), 0);
    }

    #[test]
    fn range_edges() {
        assert!(calculate_baud_registers(46).is_ok());
        assert!(calculate_baud_registers(8_000_000).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        #[test]
        fn prop_result_is_the_best_candidate(target in 1u32..10_000_000) {
            let all: Vec<_> = candidates(target).collect();
            match calculate_baud_registers(target) {
                Ok(regs) => {
                    prop_assert!(!all.is_empty());
                    for candidate in &all {
                        prop_assert!(regs.relative_error <= candidate.relative_error);
                    }
                    prop_assert!([0, 1, 2, 3, 7].contains(&regs.prescaler));
                    prop_assert!(regs.divisor <= 254);

                    let measured = (regs.actual_baud_rate - target as f64).abs() / target as f64;
                    prop_assert!((measured - regs.relative_error).abs() < 1e-12);
                }
                Err(BaudError::Unsolvable { target: reported }) => {
                    prop_assert!(all.is_empty());
                    prop_assert_eq!(reported, target);
                }
            }
        }

        #[test]
        fn prop_repeatable(target: u32) {
            let first = calculate_baud_registers(target);
            let second = calculate_baud_registers(target);
            match (first, second) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.prescaler, b.prescaler);
                    prop_assert_eq!(a.divisor, b.divisor);
                    prop_assert_eq!(a.actual_baud_rate.to_bits(), b.actual_baud_rate.to_bits());
                    prop_assert_eq!(a.relative_error.to_bits(), b.relative_error.to_bits());
                }
                (a, b) => {
                    prop_assert_eq!(a, b);
                }
            }
        }
    }
}
