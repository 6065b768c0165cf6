use clap::{arg,crate_version,Command};
use hfenc::{huffman,static_huff,table,Error};
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

/// each error kind gets its own process exit status
fn exit_code(err: &Error) -> i32 {
    match err {
        Error::InvalidAlphabet => 2,
        Error::EncodingTooLong => 3,
        Error::UnknownSymbol(_) => 4,
        Error::MalformedEncoding => 5,
        Error::InvalidFormat => 6,
        Error::QueueFull => 7,
        Error::Io(_) => 8
    }
}

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            log::warn!("existing file will not be truncated");
            return true;
        }
        return false;
    }
    true
}

fn run() -> Result<(),Error>
{
    let long_help =
"Examples:
---------
Build a table: `hfenc generate -i my_text -o my_table`
Compress:      `hfenc compress -e my_table -i my_text -o my_compressed`
Expand:        `hfenc expand -e my_table -i my_compressed -o my_text`";

    let mut main_cmd = Command::new("hfenc")
        .about("Compress and expand with static Huffman code tables")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("generate")
        .arg(arg!(-i --input <PATH> "file whose byte frequencies drive the table").required(true))
        .arg(arg!(-o --output <PATH> "where to save the table").required(true))
        .arg(arg!(-n --name <NAME> "descriptive name stored in the table"))
        .about("build a code table from a sample file"));
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-e --encoding <PATH> "code table file").required(true))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));
    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-e --encoding <PATH> "code table file").required(true))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("generate") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let name = match cmd.get_one::<String>("name") {
            Some(n) => n.clone(),
            None => "default".to_string()
        };
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let data = std::fs::read(path_in)?;
        let freqs = huffman::Frequencies::tally(&name,&data);
        let table = huffman::generate(&freqs)?;
        table.save(path_out)?;
        eprintln!("saved table with {} symbols",table.len());
    }

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let path_enc = cmd.get_one::<String>("encoding").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let table = table::CodeTable::load(path_enc)?;
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let (in_size,out_size) = static_huff::compress(&mut in_file,&mut out_file,&table)?;
        out_file.set_len(out_size)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let path_enc = cmd.get_one::<String>("encoding").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let table = table::CodeTable::load(path_enc)?;
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let (in_size,out_size) = static_huff::expand(&mut in_file,&mut out_file,&table)?;
        out_file.set_len(out_size)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    Ok(())
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{}",e);
            std::process::exit(exit_code(&e));
        }
    }
}
