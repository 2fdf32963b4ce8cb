use std::{
    mem,
    path::{Component, Path, PathBuf},
    rc::Rc,
};

use log::debug;

use crate::{
    error::RuntimeError,
    interpreter::evaluator::core::{EvalResult, Interpreter},
};

impl Interpreter {
    /// Resolves and executes an `import` statement.
    ///
    /// The path gets an `.ad` extension when it has none. Paths starting
    /// with `builtins/` (or `builtins\`) resolve against the configured
    /// builtins root with the prefix stripped; everything else resolves
    /// against the current script's directory. The result is normalized to
    /// an absolute path and checked against the registry of files already
    /// executed — re-importing is a no-op, which also breaks import cycles.
    ///
    /// The imported file's statements run in the global environment, with
    /// the current directory swapped to the file's parent for the duration
    /// and restored on all exit paths.
    ///
    /// # Errors
    /// Returns [`RuntimeError::ImportError`] when the file cannot be opened
    /// or fails to lex or parse, or whatever runtime error its execution
    /// raises.
    pub(crate) fn exec_import(&mut self, raw: &str, line: usize) -> EvalResult<()> {
        let full = absolute_normalized(&self.resolve_import_path(raw));

        if self.loaded_files.contains(&full) {
            debug!("import {}: already loaded", full.display());
            return Ok(());
        }
        self.loaded_files.insert(full.clone());

        let source = std::fs::read_to_string(&full).map_err(|_| {
                         RuntimeError::ImportError { details: format!("cannot open {}",
                                                                      full.display()),
                                                     line }
                     })?;
        let statements =
            crate::compile(&source).map_err(|err| RuntimeError::ImportError { details:
                                                                                  err.to_string(),
                                                                              line })?;
        debug!("import {}: executing {} statement(s)", full.display(), statements.len());

        let parent = full.parent().map_or_else(PathBuf::new, Path::to_path_buf);
        let previous_dir = mem::replace(&mut self.current_dir, parent);
        let previous_env = mem::replace(&mut self.env, Rc::clone(&self.globals));

        let result = self.execute_all(&statements);

        self.env = previous_env;
        self.current_dir = previous_dir;
        result.map(|_| ())
    }

    /// Turns a raw import string into an unnormalized path.
    fn resolve_import_path(&self, raw: &str) -> PathBuf {
        const PREFIXES: [&str; 2] = ["builtins/", "builtins\\"];

        if let Some(root) = &self.builtins_dir
           && let Some(prefix) = PREFIXES.iter().find(|prefix| raw.starts_with(*prefix))
        {
            let mut sub = PathBuf::from(&raw[prefix.len()..]);
            if sub.extension().is_none() {
                sub.set_extension("ad");
            }
            return root.join(sub);
        }

        let mut rel = PathBuf::from(raw);
        if rel.extension().is_none() {
            rel.set_extension("ad");
        }
        self.current_dir.join(rel)
    }
}

/// Normalizes a path lexically and anchors it to the process working
/// directory when it is relative.
///
/// `.` components drop out and `..` pops the preceding normal component.
/// Nothing touches the filesystem, so the registry key is stable whether or
/// not the file exists yet.
pub(crate) fn absolute_normalized(path: &Path) -> PathBuf {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in anchored.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if matches!(parts.last(), Some(Component::Normal(_))) {
                    parts.pop();
                } else {
                    parts.push(component);
                }
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_lexical() {
        let path = Path::new("/a/b/../c/./d.ad");
        assert_eq!(absolute_normalized(path), PathBuf::from("/a/c/d.ad"));
    }

    #[test]
    fn relative_paths_are_anchored() {
        let normalized = absolute_normalized(Path::new("x/y.ad"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("x/y.ad"));
    }
}
