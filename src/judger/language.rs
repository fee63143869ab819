use super::SubmitError;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_NAMESPACE: &str = "luogu.";
pub const DEFAULT_OPTIMIZATION_SUFFIX: &str = "o2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage {
    pub code: String,
    pub optimization: bool,
}

/// 本地语言标识 -> 远程语言
///
/// 本地标识形如 `luogu.cxx/14/gcco2` 或 `luogu.11`, 前缀之后可以是远程语言名,
/// 也可以是映射表中的编号. 末尾的 `o2` 表示开启优化.
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    namespace: String,
    suffix: String,
    table: HashMap<String, String>,
    codes: HashSet<String>,
}

impl LanguageResolver {
    pub fn new(namespace: &str, suffix: &str, table: HashMap<String, String>) -> Self {
        let codes = table.values().cloned().collect();
        Self {
            namespace: namespace.into(),
            suffix: suffix.into(),
            table,
            codes,
        }
    }

    pub fn resolve(&self, language_id: &str) -> Result<ResolvedLanguage, SubmitError> {
        let unsupported = || SubmitError::UnsupportedLanguage(language_id.into());

        let bare = match language_id.strip_prefix(self.namespace.as_str()) {
            Some(rest) => rest,
            None if self.codes.contains(language_id) => language_id,
            None => return Err(unsupported()),
        };

        let (key, optimization) = match bare.strip_suffix(self.suffix.as_str()) {
            Some(key) if !self.suffix.is_empty() => (key, true),
            _ => (bare, false),
        };

        let code = if self.codes.contains(key) {
            key.to_string()
        } else {
            self.table.get(key).cloned().ok_or_else(unsupported)?
        };

        Ok(ResolvedLanguage { code, optimization })
    }
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_NAMESPACE,
            DEFAULT_OPTIMIZATION_SUFFIX,
            luogu_language_table(),
        )
    }
}

/// 洛谷语言编号 -> 语言名
pub fn luogu_language_table() -> HashMap<String, String> {
    vec![
        (1, "pascal/fpc"),
        (2, "c/99/gcc"),
        (3, "cxx/98/gcc"),
        (4, "cxx/11/gcc"),
        (7, "python3/c"),
        (8, "java/8"),
        (9, "js/node/lts"),
        (11, "cxx/14/gcc"),
        (12, "cxx/17/gcc"),
        (13, "ruby"),
        (14, "go"),
        (15, "rust/rustc"),
        (16, "php"),
        (17, "mono_cs"),
        (18, "mono_vb"),
        (19, "haskell/ghc"),
        (21, "kotlin/jvm"),
        (22, "scala"),
        (23, "perl"),
        (25, "python3/py"),
        (27, "cxx/20/gcc"),
        (28, "cxx/noi/202107"),
        (29, "fsharp"),
        (30, "ocaml"),
        (31, "julia"),
    ]
    .into_iter()
    .map(|(id, code)| (id.to_string(), code.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(id: &str) -> Result<ResolvedLanguage, SubmitError> {
        LanguageResolver::default().resolve(id)
    }

    #[test]
    fn test_resolve_by_name() {
        let lang = resolve("luogu.cxx/14/gcc").unwrap();
        assert_eq!(lang.code, "cxx/14/gcc");
        assert!(!lang.optimization);
    }

    #[test]
    fn test_resolve_o2_suffix() {
        let lang = resolve("luogu.cxx/17/gcco2").unwrap();
        assert_eq!(lang.code, "cxx/17/gcc");
        assert!(lang.optimization);

        let lang = resolve("luogu.12o2").unwrap();
        assert_eq!(lang.code, "cxx/17/gcc");
        assert!(lang.optimization);
    }

    #[test]
    fn test_resolve_by_number() {
        assert_eq!(resolve("luogu.15").unwrap().code, "rust/rustc");
    }

    #[test]
    fn test_bare_remote_code() {
        assert_eq!(resolve("python3/py").unwrap().code, "python3/py");
    }

    #[test]
    fn test_unsupported() {
        for id in ["cc.cc14", "luogu.brainfuck", "luogu.99", "hydro.cxx/14/gcc", ""] {
            assert!(
                matches!(resolve(id), Err(SubmitError::UnsupportedLanguage(ref l)) if l == id),
                "{id}"
            );
        }
    }

    #[test]
    fn test_custom_table() {
        let table = vec![("cpp".to_string(), "54".to_string())].into_iter().collect();
        let resolver = LanguageResolver::new("cf.", "o2", table);
        assert_eq!(resolver.resolve("cf.cpp").unwrap().code, "54");
        assert!(resolver.resolve("luogu.cpp").is_err());
    }
}
