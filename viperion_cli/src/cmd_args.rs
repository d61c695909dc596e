use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command, value_parser};
use viperion::Effect;

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("viperion")
        .about("Apply a raster effect to an image and save the result as PNG")
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .help("Image file to read")
            .required(true))
        .arg(Arg::new("output-dir")
            .short('o')
            .long("output-dir")
            .help("Directory the result is written to")
            .default_value("."))
        .arg(Arg::new("name")
            .short('n')
            .long("name")
            .help("File name of the result, always PNG encoded")
            .default_value("output.png"))
        .arg(Arg::new("effect")
            .short('e')
            .long("effect")
            .help("Effect to apply")
            .value_parser(PossibleValuesParser::new(Effect::ALL.map(|effect| effect.name())))
            .required(true))
        .arg(Arg::new("parameter")
            .short('p')
            .long("parameter")
            .help("Block size for compress and pixelate, circle diameter for pointillism. 0 does nothing")
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true))
        .arg(Arg::new("seed")
            .long("seed")
            .help("Seed for pointillism, for reproducible output")
            .value_parser(value_parser!(u64)))
        .arg(Arg::new("workers")
            .long("workers")
            .help_heading("PERFORMANCE")
            .help("Maximum number of band workers [default: number of CPUs]")
            .value_parser(value_parser!(usize))
            .conflicts_with("sequential"))
        .arg(Arg::new("sequential")
            .long("sequential")
            .action(ArgAction::SetTrue)
            .help_heading("PERFORMANCE")
            .help("Run the effect on the current thread only"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display information about the edit [default]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        create_cmd_args().debug_assert();
    }

    #[test]
    fn negative_parameters_reach_the_engine() {
        let matches = create_cmd_args()
            .try_get_matches_from(["viperion", "-i", "in.png", "-e", "pixelate", "-p", "-4"])
            .unwrap();
        assert_eq!(matches.get_one::<i64>("parameter"), Some(&-4));
        assert_eq!(
            matches.get_one::<String>("output-dir").map(String::as_str),
            Some(".")
        );
    }

    #[test]
    fn workers_cannot_be_combined_with_sequential() {
        let result = create_cmd_args().try_get_matches_from([
            "viperion", "-i", "in.png", "-e", "normal", "--sequential", "--workers", "2",
        ]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );

        let matches = create_cmd_args()
            .try_get_matches_from(["viperion", "-i", "in.png", "-e", "normal", "--workers", "2"])
            .unwrap();
        assert_eq!(matches.get_one::<usize>("workers"), Some(&2));
    }

    #[test]
    fn unknown_effects_are_rejected() {
        let result =
            create_cmd_args().try_get_matches_from(["viperion", "-i", "in.png", "-e", "sepia"]);
        assert!(result.is_err());
    }
}
