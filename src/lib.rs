//! Rule-driven interwiki dispatching for wiki farms.
//!
//! A wiki farm hosts many sites under one domain, and links to them from
//! other wikis would normally need one interwiki prefix per site. The
//! dispatcher lets a single prefix reach every site of the farm by reading
//! the target site (and language) out of the page key:
//!
//! ```text
//! [[gg:terraria:Guide]]     -> https://terraria.wiki.gg/wiki/Guide
//! [[gg:de.terraria:Guide]]  -> https://terraria.wiki.gg/de/wiki/Guide
//! ```
//!
//! Each [`Rule`] maps one interwiki prefix onto URL templates. A title is
//! checked against the rules in order and the first rule which produces a URL
//! wins. If none does, the title is left for normal interwiki handling.

pub mod common;
pub mod config;
pub mod dispatch;
pub mod exists;
pub mod key;
pub mod php;
pub mod report;
pub mod rule;
pub mod title;

pub use dispatch::{Dispatcher, Skip, resolve};
pub use exists::{ExistenceCheck, KnownSites};
pub use key::{KeyPattern, ParsedKey};
pub use rule::{Rule, RuleBuilder, RuleSet};
pub use title::Title;
