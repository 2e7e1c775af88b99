// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

const CATEGORY_KEYS: [&str; 8] = [
    "flight", "hotel", "tour", "forex", "wajibath", "car", "visa", "train",
];

fn category_arg() -> Arg {
    Arg::new("category")
        .required(true)
        .value_parser(CATEGORY_KEYS)
        .help("Booking category")
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Record id, e.g. f1")
}

fn set_arg(required: bool) -> Arg {
    Arg::new("set")
        .long("set")
        .short('s')
        .value_name("FIELD=VALUE")
        .num_args(1)
        .action(ArgAction::Append)
        .required(required)
        .help("Field assignment using camelCase names, e.g. costPrice=8000")
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Pretty JSON output"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("One JSON object per line"),
    )
}

fn limit_arg(default: &'static str) -> Arg {
    Arg::new("limit")
        .long("limit")
        .short('n')
        .value_parser(value_parser!(usize))
        .default_value(default)
}

pub fn build_cli() -> Command {
    Command::new("tripledger")
        .about("Travel agency booking ledger")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("seed")
                .about("Load the demo bookings")
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Replace existing bookings"),
                ),
        )
        .subcommand(
            Command::new("booking")
                .about("Add, list, update and remove bookings")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(category_arg())
                        .arg(set_arg(true)),
                )
                .subcommand(json_flags(Command::new("list").arg(category_arg())))
                .subcommand(json_flags(
                    Command::new("show").arg(category_arg()).arg(id_arg()),
                ))
                .subcommand(
                    Command::new("update")
                        .arg(category_arg())
                        .arg(id_arg())
                        .arg(set_arg(true)),
                )
                .subcommand(Command::new("rm").arg(category_arg()).arg(id_arg())),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Totals, per-category breakdown and latest bookings")
                .arg(limit_arg("5"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(json_flags(
            Command::new("recent")
                .about("Latest bookings across all categories")
                .arg(limit_arg("10")),
        ))
        .subcommand(
            Command::new("export")
                .about("Export one category")
                .arg(category_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand_required(true)
                .subcommand(
                    Command::new("currency")
                        .about("Show or set the currency symbol")
                        .arg(Arg::new("symbol")),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn category_keys_match_model() {
        let model: Vec<_> = crate::models::Category::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(model, CATEGORY_KEYS);
    }
}
