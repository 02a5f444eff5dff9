use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Arg, ArgAction, Command, ValueHint};
use idreport_cli::input::ExportArgs;
use idreport_cli::runner::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("IDREPORT_LOG", "error,idreport=info"))
        .init();

    let matches = Command::new("idreport")
        .version(clap::crate_version!())
        .about("Scheme-driven tabular reports for protein, peptide and PSM identifications")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("registry")
                .long("registry")
                .global(true)
                .value_parser(NonEmptyStringValueParser::new())
                .help(
                    "Path to the user scheme registry. Defaults to `schemes.json` \
                     in the per-user configuration directory.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(Command::new("list").about("List built-in and user report schemes"))
        .subcommand(
            Command::new("show")
                .about("Show the sections and columns of a scheme")
                .arg(
                    Arg::new("scheme")
                        .required(true)
                        .value_parser(NonEmptyStringValueParser::new())
                        .help("Scheme name, or its number in `idreport list`"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add or replace a user scheme")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(NonEmptyStringValueParser::new())
                        .help("Path to the scheme (JSON file)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a user scheme")
                .arg(
                    Arg::new("name")
                        .required(true)
                        .value_parser(NonEmptyStringValueParser::new())
                        .help("Name of the user scheme"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write a report for an identification project")
                .arg(
                    Arg::new("scheme")
                        .short('s')
                        .long("scheme")
                        .required(true)
                        .value_parser(NonEmptyStringValueParser::new())
                        .help("Scheme name, or its number in `idreport list`"),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .required(true)
                        .value_parser(NonEmptyStringValueParser::new())
                        .help("Path to the identification project (JSON file)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .required(true)
                        .value_parser(NonEmptyStringValueParser::new())
                        .help(
                            "Report destination: a file for `text` output, \
                             a directory for `sheets` output",
                        )
                        .value_hint(ValueHint::AnyPath),
                )
                .arg(
                    Arg::new("validated-only")
                        .long("validated-only")
                        .action(ArgAction::SetTrue)
                        .help("Only report validated matches"),
                )
                .arg(
                    Arg::new("include-decoys")
                        .long("include-decoys")
                        .action(ArgAction::SetTrue)
                        .help("Report decoy matches too"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["text", "sheets"])
                        .default_value("text")
                        .help("Delimited text file, or one CSV file per section"),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let registry: PathBuf = match matches.get_one::<String>("registry") {
        Some(path) => path.into(),
        None => idreport_cli::default_registry_path()?,
    };
    log::debug!("using scheme registry at {}", registry.display());
    let mut runner = Runner::open(registry);

    match matches.subcommand() {
        Some(("list", _)) => {
            for line in runner.list() {
                println!("{}", line);
            }
        }
        Some(("show", sub)) => {
            if let Some(scheme) = sub.get_one::<String>("scheme") {
                print!("{}", runner.show(scheme)?);
            }
        }
        Some(("add", sub)) => {
            if let Some(path) = sub.get_one::<String>("path") {
                runner.add(path)?;
            }
        }
        Some(("remove", sub)) => {
            if let Some(name) = sub.get_one::<String>("name") {
                runner.remove(name)?;
            }
        }
        Some(("export", sub)) => {
            let args = ExportArgs::from_arguments(sub)?;
            let (summary, _) = runner.export(&args)?;
            for (section, rows) in &summary.rows {
                log::info!("{}: {} rows", section, rows);
            }
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
