// Demonstration program: two mutually exclusive switches and an option that
// depends on either of them, all under the default failure policy.

use cmdopt::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("test1: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run() -> Result<()> {
    let mut parser = Parser::builder("test1").arg_help("FILE...").build()?;

    let group = parser.add_group(
        OwnerGroup::new("options")
            .option(
                Opt::new("one")
                    .short('1')
                    .description("option one description"),
            )
            .option(
                Opt::new("two")
                    .short('2')
                    .description("option two description"),
            )
            .option(
                Opt::new("arg")
                    .short('A')
                    .takes_value()
                    .arg_help("ARG")
                    .description("option arg description"),
            ),
    )?;
    let ids = parser.options_of(group).to_vec();
    let (one, two, arg) = (ids[0], ids[1], ids[2]);

    parser.add_constraint(MutuallyExclusive::new(2, one, two))?;
    parser.add_constraint(RequiresAnyOf::new(3, arg, &[one, two]))?;

    match parser.parse(std::env::args().skip(1)) {
        Status::Complete => {}
        Status::Halted => std::process::exit(1),
        Status::Exited(code) => std::process::exit(code),
    }

    println!("one: {}", parser.matched(one));
    println!("two: {}", parser.matched(two));
    println!("arg: {}", parser.value(arg).unwrap_or("(none)"));
    println!("files: {}", parser.leftovers().join(" "));
    Ok(())
}
