//! Rewrites ES module statements into the portable `require / module / exports` convention.
//!
//! Statements are located on the masked source produced by [`mask_source`], so text inside
//! comments and literals never matches. Every `import` / `export` keyword in a statement
//! position is either rewritten or rejected; edits are applied to the original text at the
//! same byte offsets.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::OnceLock;

use regex::{Match, Regex};

use super::lexer::mask_source;
use super::{SourceTransformer, TransformedModule};
use crate::error::DialectError;

const SPECIFIER: &str = r#"(?P<spec>"[^"\n]*"|'[^'\n]*')"#;

fn pattern(cell: &'static OnceLock<Regex>, source: impl FnOnce() -> String) -> &'static Regex {
  cell.get_or_init(|| Regex::new(&source()).expect("invalid module statement regex"))
}

fn module_keyword() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"\b(?:import|export)\b".to_string())
}

fn import_statement() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || {
    format!(r"^import\b\s*(?:(?P<clause>[\w$\s{{}},*]*?)\s*\bfrom\s*)?{SPECIFIER}[ \t]*;?")
  })
}

fn export_from_statement() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || {
    format!(
      r"^export\s*(?P<clause>\*(?:\s*as\s+[\w$]+)?|\{{[^}}]*\}})\s*from\s*{SPECIFIER}[ \t]*;?"
    )
  })
}

fn export_list_statement() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"^export\s*\{(?P<list>[^}]*)\}[ \t]*;?".to_string())
}

fn export_default_prefix() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"^export\s+default\b\s*".to_string())
}

fn export_declaration_prefix() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || {
    r"^export\s+(?P<kind>async\s+function\b|function\b|class\b|const\b|let\b|var\b)".to_string()
  })
}

fn default_function() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || {
    r"^(?:async\s+)?function\b\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)?".to_string()
  })
}

fn default_class() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"^class\b\s*(?P<name>[A-Za-z_$][\w$]*)?".to_string())
}

fn declaration_name() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"^\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)".to_string())
}

fn require_call() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || format!(r"(?:^|[^\w$.])require\s*\(\s*{SPECIFIER}\s*\)"))
}

fn dynamic_import() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"(?:^|[^\w$.])(?P<kw>import)\s*\(".to_string())
}

fn import_meta() -> &'static Regex {
  static CELL: OnceLock<Regex> = OnceLock::new();
  pattern(&CELL, || r"(?:^|[^\w$.])(?P<kw>import)\s*\.\s*meta\b".to_string())
}

/// Regex-driven ES module transformer.
///
/// Supports static `import` declarations, `export` declarations and lists, default exports
/// and re-exports. Bodies without module syntax are passed through untouched, so plain
/// CommonJS modules bundle as written; their literal `require("...")` calls are reported as
/// dependencies too.
#[derive(Debug, Default, Clone, Copy)]
pub struct EsmTransformer;

impl SourceTransformer for EsmTransformer {
  fn transform(&self, source: &str) -> Result<TransformedModule, DialectError> {
    let masked = mask_source(source)?;
    reject_unsupported(source, &masked)?;

    let mut rewrite = Rewrite::new(source, &masked);
    rewrite.collect_statements()?;
    rewrite.collect_require_calls()?;
    rewrite.finish()
  }
}

fn reject_unsupported(source: &str, masked: &str) -> Result<(), DialectError> {
  if let Some(found) = import_meta().captures(masked).and_then(|caps| caps.name("kw")) {
    return Err(DialectError::at(source, found.start(), "`import.meta` is not supported"));
  }
  let call = dynamic_import()
    .captures_iter(masked)
    .filter_map(|caps| caps.name("kw"))
    .find(|kw| !is_method_definition(masked, kw.end()));
  if let Some(found) = call {
    return Err(DialectError::at(source, found.start(), "dynamic `import()` is not supported"));
  }
  Ok(())
}

/// Offsets of `import` / `export` keywords standing where a statement can begin: at the start
/// of the text or a line, or after `;`, `{` or `}`.
fn statement_keywords(masked: &str) -> Vec<usize> {
  let bytes = masked.as_bytes();
  module_keyword()
    .find_iter(masked)
    .filter(|found| {
      let before = bytes[..found.start()]
        .iter()
        .rev()
        .copied()
        .find(|byte| !matches!(byte, b' ' | b'\t' | b'\r'));
      matches!(before, None | Some(b'\n' | b';' | b'{' | b'}'))
        && bytes.get(found.end()) != Some(&b'$')
    })
    .map(|found| found.start())
    .collect()
}

/// Whether the keyword ending at `end` is an object key or a method name.
fn names_a_member(masked: &str, end: usize) -> bool {
  masked[end..].trim_start().starts_with(':') || is_method_definition(masked, end)
}

/// Whether `end` is followed by a parameter list and a body, as in `import(x) { ... }`.
fn is_method_definition(masked: &str, end: usize) -> bool {
  let bytes = masked.as_bytes();
  let mut i = end;
  while bytes.get(i).is_some_and(|byte| byte.is_ascii_whitespace()) {
    i += 1;
  }
  if bytes.get(i) != Some(&b'(') {
    return false;
  }

  let mut depth = 0usize;
  while let Some(&byte) = bytes.get(i) {
    i += 1;
    match byte {
      b'(' => depth += 1,
      b')' => {
        depth -= 1;
        if depth == 0 {
          return masked[i..].trim_start().starts_with('{');
        }
      }
      _ => {}
    }
  }
  false
}

fn span(offset: usize, found: Match<'_>) -> Range<usize> {
  offset + found.start()..offset + found.end()
}

fn binding_name(index: usize) -> String {
  format!("__modpack_import_{index}")
}

#[derive(Debug)]
enum ModuleStatement {
  Import {
    specifier: String,
    clause: Option<ImportClause>,
  },
  /// Any `export ... from`; `all` marks a bare `export * from`.
  Reexport { specifier: String, all: bool },
}

#[derive(Debug, Default)]
struct ImportClause {
  default: Option<String>,
  namespace: Option<String>,
  named: Vec<(String, String)>,
}

#[derive(Debug)]
struct Edit {
  start: usize,
  end: usize,
  replacement: String,
}

#[derive(Debug)]
struct Export {
  name: String,
  /// Getter body; `None` when the body assigns the value itself.
  expression: Option<String>,
  offset: usize,
}

struct Rewrite<'a> {
  source: &'a str,
  masked: &'a str,
  statements: Vec<(usize, ModuleStatement)>,
  requires: Vec<(usize, String)>,
  edits: Vec<Edit>,
  exports: Vec<Export>,
  module_syntax: bool,
}

impl<'a> Rewrite<'a> {
  fn new(source: &'a str, masked: &'a str) -> Self {
    Self {
      source,
      masked,
      statements: Vec::new(),
      requires: Vec::new(),
      edits: Vec::new(),
      exports: Vec::new(),
      module_syntax: false,
    }
  }

  fn error(&self, offset: usize, message: impl Into<String>) -> DialectError {
    DialectError::at(self.source, offset, message)
  }

  fn specifier(&self, range: Range<usize>) -> Result<String, DialectError> {
    let literal = &self.source[range.clone()];
    let inner = &literal[1..literal.len() - 1];
    if inner.contains('\\') {
      return Err(self.error(range.start, "escape sequences in module specifiers are not supported"));
    }
    if inner.is_empty() {
      return Err(self.error(range.start, "empty module specifier"));
    }
    Ok(inner.to_string())
  }

  /// Blank out a whole statement, keeping its line breaks so later lines keep their numbers.
  fn remove(&mut self, start: usize, end: usize) {
    let newlines = self.source[start..end].matches('\n').count();
    self.edits.push(Edit {
      start,
      end,
      replacement: "\n".repeat(newlines),
    });
  }

  fn export(&mut self, name: String, expression: Option<String>, offset: usize) {
    self.exports.push(Export {
      name,
      expression,
      offset,
    });
  }

  fn collect_statements(&mut self) -> Result<(), DialectError> {
    let masked = self.masked;
    for start in statement_keywords(masked) {
      let handled = if masked[start..].starts_with("import") {
        self.collect_import(start)?
      } else {
        self.collect_reexport(start)?
          || self.collect_export_list(start)?
          || self.collect_export_default(start)
          || self.collect_export_declaration(start)?
      };

      // Both keywords are six bytes long.
      let keyword = &masked[start..start + 6];
      if handled {
        self.module_syntax = true;
      } else if !names_a_member(masked, start + keyword.len()) {
        return Err(self.error(start, format!("unsupported `{keyword}` statement")));
      }
    }
    Ok(())
  }

  fn collect_import(&mut self, start: usize) -> Result<bool, DialectError> {
    let (source, masked) = (self.source, self.masked);
    let Some(caps) = import_statement().captures(&masked[start..]) else {
      return Ok(false);
    };
    let (Some(whole), Some(spec)) = (caps.get(0), caps.name("spec")) else {
      return Ok(false);
    };

    let specifier = self.specifier(span(start, spec))?;
    let clause = match caps.name("clause") {
      Some(found) => {
        let found = span(start, found);
        Some(
          parse_import_clause(&source[found.clone()])
            .ok_or_else(|| self.error(found.start, "malformed import clause"))?,
        )
      }
      None => None,
    };
    self.remove(start, start + whole.end());
    self
      .statements
      .push((start, ModuleStatement::Import { specifier, clause }));
    Ok(true)
  }

  fn collect_reexport(&mut self, start: usize) -> Result<bool, DialectError> {
    let (source, masked) = (self.source, self.masked);
    let Some(caps) = export_from_statement().captures(&masked[start..]) else {
      return Ok(false);
    };
    let (Some(whole), Some(clause), Some(spec)) =
      (caps.get(0), caps.name("clause"), caps.name("spec"))
    else {
      return Ok(false);
    };

    let specifier = self.specifier(span(start, spec))?;
    let clause = span(start, clause);
    let clause_text = &source[clause.clone()];
    let binding = binding_name(self.statements.len());
    let all = if let Some(rest) = clause_text.strip_prefix('*') {
      match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [] => true,
        ["as", name] if is_identifier(name) => {
          self.export((*name).to_string(), Some(binding), start);
          false
        }
        _ => return Err(self.error(clause.start, "malformed re-export clause")),
      }
    } else {
      let names = parse_named_list(&clause_text[1..clause_text.len() - 1])
        .ok_or_else(|| self.error(clause.start, "malformed re-export list"))?;
      for (imported, exported) in names {
        self.export(exported, Some(format!("{binding}.{imported}")), start);
      }
      false
    };

    self.remove(start, start + whole.end());
    self
      .statements
      .push((start, ModuleStatement::Reexport { specifier, all }));
    Ok(true)
  }

  fn collect_export_list(&mut self, start: usize) -> Result<bool, DialectError> {
    let (source, masked) = (self.source, self.masked);
    let Some(caps) = export_list_statement().captures(&masked[start..]) else {
      return Ok(false);
    };
    let (Some(whole), Some(list)) = (caps.get(0), caps.name("list")) else {
      return Ok(false);
    };
    let end = start + whole.end();
    if masked[end..].trim_start().starts_with("from") {
      return Ok(false);
    }

    let list = span(start, list);
    let names = parse_named_list(&source[list.clone()])
      .ok_or_else(|| self.error(list.start, "malformed export list"))?;
    for (local, exported) in names {
      self.export(exported, Some(local), start);
    }
    self.remove(start, end);
    Ok(true)
  }

  fn collect_export_default(&mut self, start: usize) -> bool {
    let masked = self.masked;
    let Some(prefix) = export_default_prefix().find(&masked[start..]) else {
      return false;
    };
    let end = start + prefix.end();
    let rest = &masked[end..];
    let declared_name = default_function()
      .captures(rest)
      .or_else(|| default_class().captures(rest))
      .and_then(|found| found.name("name"))
      .map(|name| name.as_str())
      .filter(|name| *name != "extends");

    let replacement = match declared_name {
      Some(name) => {
        self.export("default".to_string(), Some(name.to_string()), start);
        String::new()
      }
      None => {
        self.export("default".to_string(), None, start);
        "exports[\"default\"] = ".to_string()
      }
    };
    self.edits.push(Edit {
      start,
      end,
      replacement,
    });
    true
  }

  fn collect_export_declaration(&mut self, start: usize) -> Result<bool, DialectError> {
    let (source, masked) = (self.source, self.masked);
    let Some(caps) = export_declaration_prefix().captures(&masked[start..]) else {
      return Ok(false);
    };
    let (Some(whole), Some(kind)) = (caps.get(0), caps.name("kind")) else {
      return Ok(false);
    };
    let end = start + whole.end();
    let kind_start = start + kind.start();

    let names = match kind.as_str() {
      "const" | "let" | "var" => declarator_names(source, masked, end)?,
      _ => {
        let name = declaration_name()
          .captures(&masked[end..])
          .and_then(|found| found.name("name"))
          .map(|name| name.as_str().to_string())
          .ok_or_else(|| self.error(kind_start, "exported declaration needs a name"))?;
        vec![name]
      }
    };
    for name in names {
      self.export(name.clone(), Some(name), start);
    }
    self.edits.push(Edit {
      start,
      end: kind_start,
      replacement: String::new(),
    });
    Ok(true)
  }

  fn collect_require_calls(&mut self) -> Result<(), DialectError> {
    let calls: Vec<_> = require_call()
      .captures_iter(self.masked)
      .filter_map(|caps| caps.name("spec"))
      .map(|spec| spec.range())
      .collect();
    for range in calls {
      let offset = range.start;
      let specifier = self.specifier(range)?;
      self.requires.push((offset, specifier));
    }
    Ok(())
  }

  fn finish(mut self) -> Result<TransformedModule, DialectError> {
    let mut dependencies: Vec<(usize, String)> = self
      .statements
      .iter()
      .map(|(offset, statement)| (*offset, statement.specifier().to_string()))
      .chain(self.requires.iter().cloned())
      .collect();
    dependencies.sort_by_key(|(offset, _)| *offset);
    let dependencies = dependencies
      .into_iter()
      .map(|(_, specifier)| specifier)
      .collect();

    if !self.module_syntax {
      return Ok(TransformedModule {
        dependencies,
        code: self.source.to_string(),
      });
    }

    let mut prologue =
      vec!["Object.defineProperty(exports, \"__esModule\", { value: true });".to_string()];
    let mut exported = BTreeSet::new();
    for export in &self.exports {
      if !exported.insert(export.name.as_str()) {
        return Err(self.error(export.offset, format!("duplicate export `{}`", export.name)));
      }
      if let Some(expression) = &export.expression {
        prologue.push(format!(
          "Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ return {expression}; }} }});",
          js_string(&export.name)
        ));
      }
    }

    for (index, (_, statement)) in self.statements.iter().enumerate() {
      let binding = binding_name(index);
      let request = format!("require({})", js_string(statement.specifier()));
      match statement {
        ModuleStatement::Import { clause: None, .. } => prologue.push(format!("{request};")),
        ModuleStatement::Import {
          clause: Some(clause),
          ..
        } => {
          prologue.push(format!("var {binding} = {request};"));
          if let Some(local) = &clause.default {
            prologue.push(format!(
              "var {local} = {binding} && {binding}.__esModule ? {binding}[\"default\"] : {binding};"
            ));
          }
          if let Some(local) = &clause.namespace {
            prologue.push(format!("var {local} = {binding};"));
          }
          for (imported, local) in &clause.named {
            prologue.push(format!("var {local} = {binding}.{imported};"));
          }
        }
        ModuleStatement::Reexport { all: false, .. } => {
          prologue.push(format!("var {binding} = {request};"));
        }
        ModuleStatement::Reexport { all: true, .. } => {
          prologue.push(format!("var {binding} = {request};"));
          prologue.push(format!(
            "Object.keys({binding}).forEach(function (key) {{ \
if (key === \"default\" || key === \"__esModule\" || Object.prototype.hasOwnProperty.call(exports, key)) return; \
Object.defineProperty(exports, key, {{ enumerable: true, get: function () {{ return {binding}[key]; }} }}); }});"
          ));
        }
      }
    }

    self.edits.sort_by_key(|edit| edit.start);
    let mut body = String::with_capacity(self.source.len());
    let mut cursor = 0;
    for edit in &self.edits {
      if edit.start < cursor {
        continue;
      }
      body.push_str(&self.source[cursor..edit.start]);
      body.push_str(&edit.replacement);
      cursor = edit.end;
    }
    body.push_str(&self.source[cursor..]);

    Ok(TransformedModule {
      dependencies,
      code: format!("{}\n{}", prologue.join("\n"), body),
    })
  }
}

impl ModuleStatement {
  fn specifier(&self) -> &str {
    match self {
      Self::Import { specifier, .. } | Self::Reexport { specifier, .. } => specifier,
    }
  }
}

fn js_string(value: &str) -> String {
  serde_json::Value::from(value).to_string()
}

fn is_identifier(value: &str) -> bool {
  let mut chars = value.chars();
  match chars.next() {
    Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
    _ => return false,
  }
  chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Parse `a, b as c` into `(a, a)`, `(b, c)` pairs.
fn parse_named_list(list: &str) -> Option<Vec<(String, String)>> {
  let mut names = Vec::new();
  for item in list.split(',') {
    let parts: Vec<&str> = item.split_whitespace().collect();
    match parts.as_slice() {
      [] => {}
      [name] if is_identifier(name) => names.push((name.to_string(), name.to_string())),
      [name, "as", alias] if is_identifier(name) && is_identifier(alias) => {
        names.push((name.to_string(), alias.to_string()))
      }
      _ => return None,
    }
  }
  Some(names)
}

fn parse_import_clause(clause: &str) -> Option<ImportClause> {
  let mut parsed = ImportClause::default();
  let mut rest = clause.trim();

  if !rest.starts_with('{') && !rest.starts_with('*') {
    let (name, tail) = match rest.find(',') {
      Some(index) => (rest[..index].trim(), rest[index + 1..].trim()),
      None => (rest, ""),
    };
    if !is_identifier(name) {
      return None;
    }
    parsed.default = Some(name.to_string());
    if tail.is_empty() {
      return Some(parsed);
    }
    rest = tail;
  }

  if let Some(namespace) = rest.strip_prefix('*') {
    match namespace.split_whitespace().collect::<Vec<_>>().as_slice() {
      ["as", name] if is_identifier(name) => parsed.namespace = Some((*name).to_string()),
      _ => return None,
    }
    return Some(parsed);
  }

  let inner = rest.strip_prefix('{')?.strip_suffix('}')?;
  parsed.named = parse_named_list(inner)?;
  Some(parsed)
}

/// Binding names declared by `export const|let|var` starting at `start` in the masked text.
fn declarator_names(
  source: &str,
  masked: &str,
  start: usize,
) -> Result<Vec<String>, DialectError> {
  let bytes = masked.as_bytes();
  let mut names = Vec::new();
  let mut i = start;

  loop {
    while bytes.get(i).is_some_and(|byte| byte.is_ascii_whitespace()) {
      i += 1;
    }
    if matches!(bytes.get(i), Some(b'{') | Some(b'[')) {
      return Err(DialectError::at(
        source,
        i,
        "destructuring export declarations are not supported",
      ));
    }

    let name_len: usize = masked[i..]
      .chars()
      .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
      .map(char::len_utf8)
      .sum();
    if name_len == 0 {
      return Err(DialectError::at(source, i, "expected a binding name after `export`"));
    }
    names.push(masked[i..i + name_len].to_string());
    i += name_len;

    let mut depth = 0usize;
    loop {
      match bytes.get(i) {
        None | Some(b';') if depth == 0 => return Ok(names),
        None => return Ok(names),
        Some(b'(') | Some(b'[') | Some(b'{') => depth += 1,
        Some(b')') | Some(b']') | Some(b'}') => {
          if depth == 0 {
            return Ok(names);
          }
          depth -= 1;
        }
        Some(b',') if depth == 0 => {
          i += 1;
          break;
        }
        Some(b'\n') if depth == 0 && !continues_expression(bytes, i) => return Ok(names),
        _ => {}
      }
      i += 1;
    }
  }
}

/// Whether the line break at `index` sits inside a still-running expression.
fn continues_expression(bytes: &[u8], index: usize) -> bool {
  let before = bytes[..index]
    .iter()
    .rev()
    .find(|byte| !byte.is_ascii_whitespace());
  let after = bytes[index..]
    .iter()
    .find(|byte| !byte.is_ascii_whitespace());

  before.is_some_and(|byte| b",=+-*/%&|^?:<>!~(".contains(byte))
    || after.is_some_and(|byte| b".,?:=+-*/%&|^<>([".contains(byte))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn transform(source: &str) -> TransformedModule {
    EsmTransformer.transform(source).unwrap()
  }

  #[test]
  fn collects_dependencies_in_source_order_with_duplicates() {
    let module = transform(
      "import a from './a.js';\nimport './side.js';\nexport { b } from \"./b.js\";\nimport { c } from './a.js';\n",
    );
    assert_eq!(module.dependencies, vec![
      "./a.js".to_string(),
      "./side.js".to_string(),
      "./b.js".to_string(),
      "./a.js".to_string(),
    ]);
  }

  #[test]
  fn hoists_imports_into_require_calls() {
    let module = transform("console.log(message);\nimport message from './message.js';\n");
    let require_at = module.code.find("require(\"./message.js\")").unwrap();
    let log_at = module.code.find("console.log(message)").unwrap();
    assert!(require_at < log_at);
    assert!(module.code.contains(
      "var message = __modpack_import_0 && __modpack_import_0.__esModule ? __modpack_import_0[\"default\"] : __modpack_import_0;"
    ));
    assert!(!module.code.contains("import message"));
  }

  #[test]
  fn binds_namespace_and_named_imports() {
    let module = transform("import def, { a, b as c } from './x.js';\nimport * as ns from './y.js';\n");
    assert!(module.code.contains("var __modpack_import_0 = require(\"./x.js\");"));
    assert!(module.code.contains("var a = __modpack_import_0.a;"));
    assert!(module.code.contains("var c = __modpack_import_0.b;"));
    assert!(module.code.contains("var ns = __modpack_import_1;"));
  }

  #[test]
  fn side_effect_import_keeps_only_the_call() {
    let module = transform("import './polyfill.js';\nrun();\n");
    assert!(module.code.contains("\nrequire(\"./polyfill.js\");\n"));
    assert!(!module.code.contains("__modpack_import_0"));
  }

  #[test]
  fn exports_declarations_as_live_getters() {
    let module = transform(
      "export const answer = 42, other = f(1, 2);\nexport function greet() {}\nexport class Widget {}\n",
    );
    for name in ["answer", "other", "greet", "Widget"] {
      assert!(
        module.code.contains(&format!(
          "Object.defineProperty(exports, \"{name}\", {{ enumerable: true, get: function () {{ return {name}; }} }});"
        )),
        "missing getter for {name}"
      );
    }
    assert!(module.code.contains("\nconst answer = 42, other = f(1, 2);"));
    assert!(module.code.contains("\nfunction greet() {}"));
    assert!(module.code.contains("\nclass Widget {}"));
    assert!(module.code.starts_with("Object.defineProperty(exports, \"__esModule\", { value: true });"));
  }

  #[test]
  fn rewrites_default_exports() {
    let module = transform("export default `hello ${name}`;\n");
    assert!(module.code.contains("exports[\"default\"] = `hello ${name}`;"));

    let module = transform("export default function main() {}\n");
    assert!(module.code.contains("\nfunction main() {}"));
    assert!(module.code.contains("return main;"));

    let module = transform("export default class extends Base {}\n");
    assert!(module.code.contains("exports[\"default\"] = class extends Base {}"));
  }

  #[test]
  fn exports_lists_and_reexports() {
    let module = transform(
      "const a = 1;\nexport { a, a as alias };\nexport * from './all.js';\nexport * as tools from './tools.js';\n",
    );
    assert!(module.code.contains("\"alias\", { enumerable: true, get: function () { return a; } }"));
    assert!(module.code.contains("Object.keys(__modpack_import_0).forEach"));
    assert!(module.code.contains("\"tools\", { enumerable: true, get: function () { return __modpack_import_1; } }"));
    assert_eq!(module.dependencies, vec!["./all.js".to_string(), "./tools.js".to_string()]);
  }

  #[test]
  fn passes_commonjs_through_and_reports_requires() {
    let source = "const dep = require('./dep.js');\nmodule.exports = dep + 1;\n";
    let module = transform(source);
    assert_eq!(module.code, source);
    assert_eq!(module.dependencies, vec!["./dep.js".to_string()]);
  }

  #[test]
  fn ignores_statements_inside_comments_and_strings() {
    let source = "// import x from './nope.js';\nconst s = \"import y from './nope.js'\";\nmodule.exports = s;\n";
    let module = transform(source);
    assert!(module.dependencies.is_empty());
    assert_eq!(module.code, source);
  }

  #[test]
  fn preserves_line_numbers_of_removed_statements() {
    let module = transform("import {\n  a,\n  b\n} from './x.js';\nuse(a, b);\n");
    assert!(module.code.contains("\n\n\n\nuse(a, b);"));
  }

  #[test]
  fn rejects_dynamic_import() {
    let err = EsmTransformer
      .transform("const a = 1;\nconst m = import('./lazy.js');\n")
      .unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("import()"));
  }

  #[test]
  fn rejects_import_meta() {
    let err = EsmTransformer.transform("console.log(import.meta.url);\n").unwrap_err();
    assert!(err.message.contains("import.meta"));
  }

  #[test]
  fn rejects_destructuring_exports() {
    let err = EsmTransformer
      .transform("export const { a, b } = value;\n")
      .unwrap_err();
    assert!(err.message.contains("destructuring"));
  }

  #[test]
  fn rejects_unknown_statement_forms() {
    let err = EsmTransformer
      .transform("let x = 1;\nexport = x;\n")
      .unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("unsupported `export`"));
  }

  #[test]
  fn rejects_duplicate_exports() {
    let err = EsmTransformer
      .transform("export const a = 1;\nexport { a };\n")
      .unwrap_err();
    assert!(err.message.contains("duplicate export `a`"));
    assert_eq!(err.line, 2);
  }

  #[test]
  fn duplicate_export_reports_the_repeated_line() {
    let err = EsmTransformer
      .transform("export const a = 1;\nexport function b() {}\n\nexport { a as b };\n")
      .unwrap_err();
    assert_eq!(err.line, 4);
    assert!(err.message.contains("duplicate export `b`"));
  }

  #[test]
  fn collects_several_statements_on_one_line() {
    let module = transform("import a from './a.js'; import b from './b.js';\nconsole.log(a, b);\n");
    assert_eq!(module.dependencies, vec!["./a.js".to_string(), "./b.js".to_string()]);
    assert!(module.code.contains("var __modpack_import_1 = require(\"./b.js\");"));
    assert!(!module.code.contains("import b"));
  }

  #[test]
  fn export_list_after_a_semicolon_is_rewritten() {
    let module = transform("const a = 1; export { a };\n");
    assert!(module.code.contains(
      "Object.defineProperty(exports, \"a\", { enumerable: true, get: function () { return a; } });"
    ));
    assert!(!module.code.contains("export {"));
    assert!(module.code.contains("\nconst a = 1; \n"));
  }

  #[test]
  fn statements_after_braces_are_collected() {
    let module = transform("function f() { return 1; } export { f };\n");
    assert!(module.code.contains("return f;"));

    let err = EsmTransformer
      .transform("let x = 1; export = x;\n")
      .unwrap_err();
    assert!(err.message.contains("unsupported `export`"));
  }

  #[test]
  fn rejects_syntax_errors_from_the_lexer() {
    assert!(EsmTransformer.transform("import a from './a.js\n").is_err());
    assert!(EsmTransformer.transform("export function f() {\n").is_err());
  }

  #[test]
  fn object_keys_named_like_keywords_are_not_statements() {
    let source = "module.exports = {\n  import: 1,\n  export : 2,\n};\n";
    assert_eq!(transform(source).code, source);
  }

  #[test]
  fn methods_named_like_keywords_are_not_statements() {
    let source = "class Io {\n  import(x) { return x; }\n}\nmodule.exports = new Io();\n";
    assert_eq!(transform(source).code, source);

    let source = "const o = {\n  export(x) { return (x); },\n};\nmodule.exports = o;\n";
    assert_eq!(transform(source).code, source);
  }

  #[test]
  fn call_without_a_body_is_still_a_dynamic_import() {
    let err = EsmTransformer
      .transform("class Io {\n  load() { return import('./x.js'); }\n}\n")
      .unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("import()"));
  }
}
