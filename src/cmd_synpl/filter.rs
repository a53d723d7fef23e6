use clap::*;
use synpl::libs::pair::BestScores;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("filter")
        .about("Filter 3-column BLAST hits: drop self matches, keep the best hit per pair")
        .after_help(
            r###"
<infile> is `id id score` per line, whitespace separated, e.g. cut from BLAST -m8:
    cut -f 1,2,11 blast.m8 > prefix.blast

Rules:
1. Self matches (both ids equal) are removed
2. Each pair is reordered lexicographically, so `b a` and `a b` are the same pair
3. For each pair only the lowest score is kept; on ties the first one wins
4. Output is tab separated and sorted by pair

Notes:
* <infile> can be `stdin`, .gz is supported
* <outfile> can be `stdout`
* Record counts are printed to stderr
* Any malformed line aborts the run and <outfile> is left untouched
* Scores are printed like printf's %g, so filtering a filtered file changes nothing

Examples:
1. Filter a BLAST result:
   synpl filter at_vv.raw.blast at_vv.blast

2. Read from a pipe:
   cut -f 1,2,11 at_vv.m8 | synpl filter stdin stdout

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input 3-column BLAST file"),
        )
        .arg(
            Arg::new("outfile")
                .required(true)
                .index(2)
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let outfile = args.get_one::<String>("outfile").unwrap();

    //----------------------------
    // Ops
    //----------------------------
    let reader = synpl::reader(infile)?;
    let (best, stats) = BestScores::from_reader(reader, infile)?;

    eprintln!("{} records read", stats.read);
    eprintln!("{} records after filtering", stats.retained);

    //----------------------------
    // Output
    //----------------------------
    let mut writer = synpl::AtomicWriter::create(outfile)?;
    if let Err(why) = best.write_to(&mut writer) {
        return Err(writer.error(why).into());
    }
    writer.commit()?;

    log::debug!("{} pairs written to {}", stats.retained, outfile);

    Ok(())
}
