// build.rs

use clap::{Arg, ArgAction, ArgGroup, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn flag(id: &'static str, short: char, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(long)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("pcurate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pcurate Contributors")
        .about("Curate the explicitly installed packages on an Arch Linux system")
        .arg(Arg::new("package").value_name("PACKAGE_NAME").help("Package to show or modify"))
        .arg(flag("set", 's', "set", "Set package curated status"))
        .arg(flag("unset", 'u', "unset", "Unset package curated status"))
        .arg(
            Arg::new("tag")
                .short('t')
                .long("tag")
                .value_name("TAG")
                .help("Set package tag"),
        )
        .arg(
            Arg::new("description")
                .short('d')
                .long("desc")
                .value_name("DESCRIPTION")
                .help("Set package description"),
        )
        .arg(flag("curated", 'c', "curated", "Display all curated packages"))
        .arg(flag("regular", 'n', "regular", "Display packages that are not curated").visible_alias("normal"))
        .arg(flag("missing", 'm', "missing", "Display curated packages that are no longer explicitly installed"))
        .arg(flag("native", 'N', "native", "Only consider native packages"))
        .arg(flag("foreign", 'F', "foreign", "Only consider foreign packages"))
        .arg(flag("verbose", 'v', "verbose", "Display additional info (comma separated)"))
        .arg(
            Arg::new("config_dir")
                .long("config-dir")
                .value_name("PATH")
                .env("PCURATE_CONFIG_DIR")
                .help("Configuration directory (default: $XDG_CONFIG_HOME/pcurate)"),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                .help("Print shell completions and exit"),
        )
        .group(ArgGroup::new("display").args(["curated", "regular", "missing"]))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("pcurate.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
