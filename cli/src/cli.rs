use clap::Parser;

#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Cli {
    /// Line speed to program into the chip before streaming
    #[clap(default_value_t = 9600, value_parser = clap::value_parser!(u32).range(1..))]
    pub baud_rate: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_9600() {
        let cli = Cli::try_parse_from(["ch34x-bench"]).unwrap();
        assert_eq!(cli.baud_rate, 9600);
    }

    #[test]
    fn positional_baud_rate() {
        let cli = Cli::try_parse_from(["ch34x-bench", "115200"]).unwrap();
        assert_eq!(cli.baud_rate, 115_200);
    }

    #[test]
    fn rejects_bad_rates() {
        assert!(Cli::try_parse_from(["ch34x-bench", "0"]).is_err());
        assert!(Cli::try_parse_from(["ch34x-bench", "fast"]).is_err());
        assert!(Cli::try_parse_from(["ch34x-bench", "9600", "--flow"]).is_err());
    }
}
