// Demonstration program: test1's options plus a joined, comma-delimited
// define switch, a tolerant missing-argument policy and execute hooks.

use cmdopt::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut parser = Parser::builder("test2")
        .arg_help("FILE...")
        .missing_argument(MissingArgument::Ignore)
        .help_header("Exercise joined and delimited options.")
        .help_footer("Defines may be repeated; later values are appended.")
        .build()?;

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
                    .description("option arg description")
                    .on_execute(|state| {
                        println!("executing arg: {}", state.captured().unwrap_or(""));
                        Ok(())
                    }),
            )
            .option(
                Opt::joined('D', false)
                    .delimiter(",")
                    .arg_help("KEY=VALUE[,KEY=VALUE...]")
                    .description("define properties"),
            ),
    )?;
    let ids = parser.options_of(group).to_vec();
    let (one, two, arg, define) = (ids[0], ids[1], ids[2], ids[3]);

    parser.add_constraint(MutuallyExclusive::new(2, one, two))?;

    match parser.parse(std::env::args().skip(1)) {
        Status::Complete => {}
        Status::Halted => std::process::exit(1),
        Status::Exited(code) => std::process::exit(code),
    }

    println!("one: {}", parser.matched(one));
    println!("two: {}", parser.matched(two));
    println!("arg: {}", parser.value(arg).unwrap_or("(none)"));
    println!("defines: {}", parser.values(define).join(" "));
    println!("files: {}", parser.leftovers().join(" "));
    parser.execute()
}
