extern crate clap;
use clap::*;

mod cmd_synpl;

fn main() -> anyhow::Result<()> {
    let app = Command::new("synpl")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`synpl` - Synteny pipeline around MCL and MCScan")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show debug messages"),
        )
        .subcommand(cmd_synpl::filter::make_subcommand())
        .subcommand(cmd_synpl::run::make_subcommand())
        .after_help(
            r###"Subcommands:

* filter - Filter 3-column BLAST hits into unique, best-scoring pairs
* run    - Pipeline: mcl clustering, then mcscan multiple alignment

Typical usage:
    synpl filter at_vv.raw.blast at_vv.blast
    synpl run at_vv

"###,
        );

    let matches = app.get_matches();

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .with_utc_offset(local_offset())
        .init()?;

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("filter", sub_matches)) => cmd_synpl::filter::execute(sub_matches),
        Some(("run", sub_matches)) => cmd_synpl::run::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

// Must be called before any thread is spawned
fn local_offset() -> time::UtcOffset {
    time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC)
}
