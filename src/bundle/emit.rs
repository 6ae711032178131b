//! Rendering of a [`BundleTable`] into the final script text.

use serde_json::{Map, Value};

use super::runtime::render_runtime;
use super::table::{BundleEntry, BundleTable};
use crate::models::SpecifierMap;

/// Render `table` as a self-contained script.
///
/// Rows are written in table order so the same graph always produces byte-identical output.
pub fn emit_bundle(table: &BundleTable) -> String {
  let modules: Vec<String> = table.entries().iter().map(render_entry).collect();
  render_runtime(&modules.join("\n"), table.entry())
}

fn render_entry(entry: &BundleEntry) -> String {
  let code = entry.code.trim_end();
  format!(
    "  {id}: [\n    function (require, module, exports) {{\n{code}\n    }},\n    {mapping}\n  ],",
    id = entry.id,
    mapping = render_mapping(&entry.mapping),
  )
}

fn render_mapping(mapping: &SpecifierMap) -> String {
  let object: Map<String, Value> = mapping
    .iter()
    .map(|(specifier, id)| (specifier.clone(), Value::from(id.index())))
    .collect();
  Value::Object(object).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ModuleId;

  fn entry(id: usize, code: &str, mapping: &[(&str, usize)]) -> BundleEntry {
    BundleEntry {
      id: ModuleId(id),
      code: code.to_string(),
      mapping: mapping
        .iter()
        .map(|(specifier, target)| (specifier.to_string(), ModuleId(*target)))
        .collect(),
    }
  }

  #[test]
  fn wraps_each_body_in_the_three_parameter_convention() {
    let table = BundleTable::new(vec![
      entry(0, "var m = require(\"./message.js\");\n", &[("./message.js", 1)]),
      entry(1, "module.exports = 1", &[]),
    ]);

    let script = emit_bundle(&table);
    assert!(script.contains(
      "  0: [\n    function (require, module, exports) {\nvar m = require(\"./message.js\");\n    },\n    {\"./message.js\":1}\n  ],"
    ));
    assert!(script.contains(
      "  1: [\n    function (require, module, exports) {\nmodule.exports = 1\n    },\n    {}\n  ],"
    ));
    assert!(script.contains("requireById(0);"));
  }

  #[test]
  fn emits_rows_in_table_order() {
    let table = BundleTable::new(vec![
      entry(0, "a", &[]),
      entry(1, "b", &[]),
      entry(2, "c", &[]),
    ]);
    let script = emit_bundle(&table);
    let first = script.find("  0: [").unwrap();
    let second = script.find("  1: [").unwrap();
    let third = script.find("  2: [").unwrap();
    assert!(first < second && second < third);
    assert_eq!(script, emit_bundle(&table.clone()));
  }

  #[test]
  fn escapes_specifiers_in_mappings() {
    let mapping: SpecifierMap = [("./say \"hi\".js".to_string(), ModuleId(3))].into_iter().collect();
    assert_eq!(render_mapping(&mapping), r#"{"./say \"hi\".js":3}"#);
  }
}
