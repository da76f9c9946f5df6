use log::debug;
use simplelog::{Config, TermLogger, TerminalMode};
use std::{fs, io};
use stl_inspect::{
    catalog::{discover, print_listing, prompt_selection},
    config::{Opt, Settings},
    pipeline::{run, PipelineError},
};
use structopt::StructOpt;

fn main() -> Result<(), PipelineError> {
    let opt = Opt::from_args();
    // runs without logging if the terminal can't be set up
    let _ = TermLogger::init(opt.log_level(), Config::default(), TerminalMode::Stderr);
    let settings = Settings::from_opt(&opt)?;
    debug!("{:?}", settings);

    fs::create_dir_all(&settings.report_folder)?;
    let entries = discover(&settings.stl_folder)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_listing(&entries, &mut out)?;
    let stdin = io::stdin();
    let entry = prompt_selection(&entries, &mut stdin.lock(), &mut out)?;
    drop(out);
    println!("Chosen file: {}", entry.path.display());

    let outcome = run(entry, &settings)?;
    println!("Zip file saved to: {}", outcome.archive.display());
    println!(
        "Temporary files removed: {}.gif, Relatorio_{}.txt",
        entry.name, entry.name
    );
    match (&outcome.preview, &settings.preview) {
        (Some(preview), _) => println!("Preview saved to: {}", preview.display()),
        (None, Some(requested)) => println!("Preview not written: {}", requested.display()),
        (None, None) => {},
    }
    Ok(())
}
