/// Whether a specifier names a package rather than a path.
///
/// Only `./`, `../` and `/` prefixed specifiers (and the bare `.`/`..` directory forms) are
/// paths; anything else would need a package lookup, which the resolver does not perform.
pub fn is_bare_specifier(specifier: &str) -> bool {
  !(specifier.starts_with("./")
    || specifier.starts_with("../")
    || specifier.starts_with('/')
    || specifier == "."
    || specifier == "..")
}
