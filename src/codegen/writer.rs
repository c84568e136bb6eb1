//! Structured C text emission.
//!
//! Every construct the generator produces (defines, tables, struct fields,
//! routine bodies) goes through one method here, so prefixing and
//! indentation live in a single place.

use std::fmt::Write as _;

pub(crate) struct CodeWriter {
    out: String,
    prefix: String,
}

impl CodeWriter {
    pub(crate) fn new(prefix: &str) -> Self {
        Self {
            out: String::new(),
            prefix: prefix.to_string(),
        }
    }

    /// A generated identifier: `prefix` + `base`.
    pub(crate) fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }

    /// A line indented by `depth` tabs.
    pub(crate) fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    pub(crate) fn comment(&mut self, depth: usize, text: &str) {
        self.line(depth, &format!("/* {} */", text));
    }

    /// Verbatim text, newline-terminated if it is not empty.
    pub(crate) fn raw(&mut self, text: &str) {
        self.out.push_str(text);
        if !text.is_empty() && !text.ends_with('\n') {
            self.out.push('\n');
        }
    }

    pub(crate) fn include(&mut self, header: &str) {
        self.line(0, &format!("#include <{}>", header));
    }

    /// `#define <prefix><name> <value>`
    pub(crate) fn define(&mut self, name: &str, value: &str) {
        let name = self.name(name);
        self.line(0, &format!("#define {} {}", name, value));
    }

    /// A one-line array: `static <ty> <name>[] = { a, b, 0 };`
    pub(crate) fn inline_array(&mut self, ty: &str, name: &str, items: &[String], terminator: &str) {
        let mut body = String::new();
        for item in items {
            let _ = write!(body, "{}, ", item);
        }
        body.push_str(terminator);
        let decl = declarator(ty, &self.name(name));
        self.line(0, &format!("static {}[] = {{ {} }};", decl, body));
    }

    /// A multi-line array whose slot 0 is `head`, one entry per line with an
    /// optional trailing comment.
    pub(crate) fn table(&mut self, ty: &str, name: &str, head: &str, entries: &[(String, Option<String>)]) {
        let decl = declarator(ty, &self.name(name));
        self.line(0, &format!("static {}[] = {{", decl));
        self.line(1, &format!("{},", head));
        for (value, comment) in entries {
            match comment {
                Some(c) => self.line(1, &format!("{}, /* {} */", value, c)),
                None => self.line(1, &format!("{},", value)),
            }
        }
        self.line(0, "};");
        self.blank();
    }

    pub(crate) fn open_function(&mut self, signature: &str) {
        self.line(0, signature);
        self.line(0, "{");
    }

    pub(crate) fn close_function(&mut self) {
        self.line(0, "}");
        self.blank();
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// `short x` or `const char **x`: pointer stars bind to the name.
fn declarator(ty: &str, name: &str) -> String {
    if ty.ends_with('*') {
        format!("{}{}", ty, name)
    } else {
        format!("{} {}", ty, name)
    }
}

/// Quote text for a C string literal. Grammar templates already carry their
/// escapes, so only the rule descriptions need this.
pub(crate) fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_define() {
        let mut w = CodeWriter::new("x_");
        w.define("reg_NT", "1");
        assert_eq!(w.finish(), "#define x_reg_NT 1\n");
    }

    #[test]
    fn test_inline_array() {
        let mut w = CodeWriter::new("_");
        w.inline_array("short", "nts_0", &["_reg_NT".to_string(), "_reg_NT".to_string()], "0");
        w.inline_array("short", "nts_1", &[], "0");
        assert_eq!(
            w.finish(),
            "static short _nts_0[] = { _reg_NT, _reg_NT, 0 };\nstatic short _nts_1[] = { 0 };\n"
        );
    }

    #[test]
    fn test_table() {
        let mut w = CodeWriter::new("_");
        w.table(
            "short",
            "reg_rules",
            "0",
            &[("2".to_string(), Some("reg: leaf".to_string())), ("3".to_string(), None)],
        );
        let out = w.finish().replace('\t', "    ");
        insta::assert_snapshot!(out.trim_end(), @r###"
        static short _reg_rules[] = {
            0,
            2, /* reg: leaf */
            3,
        };
        "###);
    }

    #[test]
    fn test_pointer_declarator() {
        let mut w = CodeWriter::new("_");
        w.inline_array("const char *", "kid_paths_0", &["\"L\"".to_string()], "0");
        assert_eq!(w.finish(), "static const char *_kid_paths_0[] = { \"L\", 0 };\n");
    }

    #[test]
    fn test_raw_adds_newline() {
        let mut w = CodeWriter::new("_");
        w.raw("int x;");
        w.raw("");
        w.raw("int y;\n");
        assert_eq!(w.finish(), "int x;\nint y;\n");
    }

    #[test]
    fn test_c_string_escapes() {
        assert_eq!(c_string("reg: plus(reg, reg)"), "\"reg: plus(reg, reg)\"");
        assert_eq!(c_string("a\"b\\"), "\"a\\\"b\\\\\"");
    }
}
