//! Module loader emitted around every bundle.
//!
//! The loader keeps one `module` record per identity. A module body runs the first time its
//! identity is required; the record is cached before the body runs, so a cyclic require
//! receives the partially populated exports instead of re-entering the body.

use crate::models::ModuleId;

/// Wrap a rendered module table in the self-starting loader.
pub fn render_runtime(modules: &str, entry: ModuleId) -> String {
  format!(
    r#"// Generated by modpack
(function (modules) {{
  var cache = {{}};

  function requireById(id) {{
    if (Object.prototype.hasOwnProperty.call(cache, id)) {{
      return cache[id].exports;
    }}
    if (!Object.prototype.hasOwnProperty.call(modules, id)) {{
      throw new Error("modpack: unknown module " + id);
    }}

    var factory = modules[id][0];
    var mapping = modules[id][1];
    var module = {{ exports: {{}} }};
    cache[id] = module;

    function localRequire(specifier) {{
      if (!Object.prototype.hasOwnProperty.call(mapping, specifier)) {{
        throw new Error("modpack: module " + id + " has no dependency \"" + specifier + "\"");
      }}
      return requireById(mapping[specifier]);
    }}

    try {{
      factory(localRequire, module, module.exports);
    }} catch (err) {{
      delete cache[id];
      throw err;
    }}
    return module.exports;
  }}

  requireById({entry});
}})({{
{modules}
}});
"#
  )
}
