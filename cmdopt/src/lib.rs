//! Command-line option parsing with owner groups, constraints and pluggable
//! failure handling.
//!
//! Options are declared with [`Opt`] builders, collected into an
//! [`OwnerGroup`] with a shared match callback, and registered on a
//! [`Parser`]. A parse walks argv once, records matches, then checks every
//! registered [`Constraint`]. Anything unexpected along the way (an unknown
//! switch, a missing value, a failed constraint) is routed through a
//! notification slot whose default prints a diagnostic and, for fatal cases,
//! exits through the parser's [`Terminal`].
//!
//! ```no_run
//! use cmdopt::{MutuallyExclusive, Opt, OwnerGroup, Parser, Status};
//!
//! # fn main() -> cmdopt::Result<()> {
//! let mut parser = Parser::builder("prog").arg_help("FILE...").build()?;
//! let group = parser.add_group(
//!     OwnerGroup::new("options")
//!         .option(Opt::new("quiet").short('q').description("say less"))
//!         .option(Opt::new("verbose").short('v').description("say more")),
//! )?;
//! let (quiet, verbose) = (parser.options_of(group)[0], parser.options_of(group)[1]);
//! parser.add_constraint(MutuallyExclusive::new(2, quiet, verbose))?;
//!
//! if parser.parse(std::env::args().skip(1)) == Status::Complete {
//!     for file in parser.leftovers() {
//!         println!("{}", file);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod constraint;
pub mod error;
pub mod group;
pub mod help;
pub mod notify;
pub mod option;
pub mod parser;
pub mod strings;
pub mod table;
pub mod terminal;

pub use constraint::{Constraint, MutuallyExclusive, Required, RequiresAnyOf, RequiresOneOf};
pub use error::{Error, Fault, Result};
pub use group::{GroupId, Match, OwnerGroup};
pub use notify::{
    ConstraintEvent, Ctx, FaultEvent, MissingArgument, OptionEvent, ShadowEvent, TokenEvent,
};
pub use option::{Alias, Arity, Attachment, Opt, OptionId, OptionSpec, OptionState, ValueShape};
pub use parser::{Parser, ParserBuilder, Status};
pub use strings::Strings;
pub use table::{Key, OptionSet};
pub use terminal::{Capture, ProcessTerminal, Terminal};
