use clap::*;
use synpl::libs::runner;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("run")
        .about("Pipeline - MCL clustering then MCScan multiple alignment")
        .after_help(
            r###"
* <prefix> should agree with your <prefix>.blast and <prefix>.gff
    * Both files must be in the current directory
    * <prefix>.blast is the output of `synpl filter`

* Steps
    1. `mcl` clusters <prefix>.blast into <prefix>.mcl
        * Skipped when <prefix>.mcl already exists, unless --force-mcl
    2. `mcscan` builds the multiple alignment from <prefix>.*

* A tool is taken from the current directory if present, otherwise from PATH

* Progress is logged to stderr with timestamps; -v shows more

Examples:
1. Default run:
   synpl run at_vv

2. Only build pairwise blocks, with mcl from a custom location:
   synpl run at_vv --mcl /opt/mcl/bin/mcl --mcscan-args "-a"

"###,
        )
        .arg(
            Arg::new("prefix")
                .required(true)
                .index(1)
                .help("Prefix of the .blast and .gff files"),
        )
        .arg(
            Arg::new("mcl")
                .long("mcl")
                .num_args(1)
                .default_value("mcl")
                .help("Path or name of the mcl executable"),
        )
        .arg(
            Arg::new("mcscan")
                .long("mcscan")
                .num_args(1)
                .default_value("mcscan")
                .help("Path or name of the mcscan executable"),
        )
        .arg(
            Arg::new("abc_tf")
                .long("abc-tf")
                .num_args(1)
                .default_value(runner::ABC_TF_DEFAULT)
                .help("Edge weight transform passed to `mcl -abc-tf`"),
        )
        .arg(
            Arg::new("force_mcl")
                .long("force-mcl")
                .action(ArgAction::SetTrue)
                .help("Rerun clustering even if <prefix>.mcl exists"),
        )
        .arg(
            Arg::new("mcscan_args")
                .long("mcscan-args")
                .num_args(1)
                .allow_hyphen_values(true)
                .help("Additional arguments passed directly to mcscan"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let prefix = args.get_one::<String>("prefix").unwrap();
    let opt_mcl = args.get_one::<String>("mcl").unwrap();
    let opt_mcscan = args.get_one::<String>("mcscan").unwrap();
    let opt_abc_tf = args.get_one::<String>("abc_tf").unwrap();
    let is_force_mcl = args.get_flag("force_mcl");
    let extra: Vec<String> = args
        .get_one::<String>("mcscan_args")
        .map(|s| s.split_whitespace().map(|e| e.to_string()).collect())
        .unwrap_or_default();

    //----------------------------
    // Inputs
    //----------------------------
    let blast = format!("{}.blast", prefix);
    let gff = format!("{}.gff", prefix);
    runner::require_files(&[&blast, &gff])?;

    //----------------------------
    // Markov clustering
    //----------------------------
    let mcl_out = format!("{}.mcl", prefix);
    if is_force_mcl || !std::path::Path::new(&mcl_out).is_file() {
        let mcl = runner::locate(opt_mcl)?;
        runner::run(&runner::mcl_step(&mcl, prefix, opt_abc_tf))?;
    } else {
        log::info!("{} exists, skip MCL clustering", mcl_out);
    }

    //----------------------------
    // Multiple alignment
    //----------------------------
    let mcscan = runner::locate(opt_mcscan)?;
    runner::run(&runner::mcscan_step(&mcscan, prefix, &extra))?;

    Ok(())
}
