use clap::Parser;

/// Train a small MLP on MNIST and report per-epoch metrics.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Example command line argument
    #[arg(long, default_value = "default_arg")]
    pub arg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_defaults_when_absent() {
        let args = Args::try_parse_from(["mnist-mlp-demo"]).unwrap();
        assert_eq!(args.arg, "default_arg");
    }

    #[test]
    fn arg_takes_the_passed_value() {
        let args = Args::try_parse_from(["mnist-mlp-demo", "--arg", "job-42"]).unwrap();
        assert_eq!(args.arg, "job-42");
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Args::try_parse_from(["mnist-mlp-demo", "--epochs", "3"]).is_err());
    }
}
