#[cfg(test)]
mod tests {
    use crate::discovery::{DiscoveryError, WalkOptions, Walker};
    use crate::tests::support::{route_tree, touch};
    use std::fs;

    fn keys(walker: &Walker) -> Vec<String> {
        walker.candidates().unwrap().map(|c| c.unwrap().relative_key()).collect()
    }

    #[test]
    fn test_byte_wise_order() {
        let tree = route_tree(&["v1/users/me.rs", "v1/users/[id].rs", "v1/users/index.rs", "v1/Zeta.rs", "v1/alpha.rs", "v2/index.rs"]);
        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();

        assert_eq!(
            keys(&walker),
            vec!["v1/Zeta.rs", "v1/alpha.rs", "v1/users/[id].rs", "v1/users/index.rs", "v1/users/me.rs", "v2/index.rs"]
        );
    }

    #[test]
    fn test_walk_is_restartable() {
        let tree = route_tree(&["v1/a.rs", "v1/b/c.rs", "v1/b/[d].rs"]);
        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();
        assert_eq!(keys(&walker), keys(&walker));
    }

    #[test]
    fn test_filters_extensions() {
        let tree = route_tree(&["v1/users.rs", "v1/README.md", "v1/notes.txt", "v1/handler.ts"]);
        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();
        assert_eq!(keys(&walker), vec!["v1/users.rs"]);

        let opts = WalkOptions { extensions: vec!["rs".into(), ".ts".into()], ..WalkOptions::default() };
        let walker = Walker::new(tree.path(), &opts).unwrap();
        assert_eq!(keys(&walker), vec!["v1/handler.ts", "v1/users.rs"]);
    }

    #[test]
    fn test_hidden_entries_skipped_unless_enabled() {
        let tree = route_tree(&["v1/.secret.rs", "v1/.drafts/users.rs", "v1/users.rs"]);

        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();
        assert_eq!(keys(&walker), vec!["v1/users.rs"]);

        let opts = WalkOptions { include_hidden: true, ..WalkOptions::default() };
        let walker = Walker::new(tree.path(), &opts).unwrap();
        assert_eq!(keys(&walker), vec!["v1/.drafts/users.rs", "v1/.secret.rs", "v1/users.rs"]);
    }

    #[test]
    fn test_excludes_prune_subtrees() {
        let tree = route_tree(&["v1/users.rs", "v1/internal/debug.rs", "v1/internal/deep/x.rs", "v1/users_test.rs"]);
        let opts = WalkOptions {
            excludes: vec!["**/internal".into(), "**/*_test.rs".into()],
            ..WalkOptions::default()
        };
        let walker = Walker::new(tree.path(), &opts).unwrap();
        assert_eq!(keys(&walker), vec!["v1/users.rs"]);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let tree = route_tree(&["v1/users.rs"]);
        let opts = WalkOptions { excludes: vec!["[unclosed".into()], ..WalkOptions::default() };
        let err = Walker::new(tree.path(), &opts).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidExclude { ref pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let tree = route_tree(&[]);
        let missing = tree.path().join("does-not-exist");
        let walker = Walker::new(&missing, &WalkOptions::default()).unwrap();
        let err = walker.candidates().err().expect("missing root must fail");
        assert!(matches!(err, DiscoveryError::DirectoryUnavailable { ref path, .. } if *path == missing));
    }

    #[test]
    fn test_root_that_is_a_file_is_unavailable() {
        let tree = route_tree(&["v1/users.rs"]);
        let file = tree.path().join("v1/users.rs");
        let walker = Walker::new(&file, &WalkOptions::default()).unwrap();
        assert!(matches!(walker.candidates(), Err(DiscoveryError::DirectoryUnavailable { .. })));
    }

    #[test]
    fn test_empty_root_yields_nothing() {
        let tree = route_tree(&[]);
        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();
        assert!(keys(&walker).is_empty());
    }

    #[test]
    fn test_candidate_paths() {
        let tree = route_tree(&["v1/users/[id].rs"]);
        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();
        let candidate = walker.candidates().unwrap().next().unwrap().unwrap();

        assert_eq!(candidate.relative_segments, vec!["v1", "users", "[id].rs"]);
        assert_eq!(candidate.full_path, tree.path().join("v1").join("users").join("[id].rs"));
        assert_eq!(walker.root(), tree.path());
    }

    #[test]
    fn test_directories_named_like_files_are_not_candidates() {
        let tree = route_tree(&["v1/users.rs/inner.rs"]);
        fs::create_dir_all(tree.path().join("v1/empty.rs")).unwrap();
        touch(tree.path(), "v1/real.rs");
        let walker = Walker::new(tree.path(), &WalkOptions::default()).unwrap();
        assert_eq!(keys(&walker), vec!["v1/real.rs", "v1/users.rs/inner.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_skipped_and_walk_continues() {
        let tree = route_tree(&["v1/a/x.rs", "v1/z.rs"]);
        std::os::unix::fs::symlink(tree.path().join("v1"), tree.path().join("v1/a/loop")).unwrap();
        let opts = WalkOptions { follow_symlinks: true, ..WalkOptions::default() };
        let walker = Walker::new(tree.path(), &opts).unwrap();

        let items: Vec<_> = walker.candidates().unwrap().collect();
        assert_eq!(items.len(), 3);
        match &items[0] {
            Err(failure) => assert_eq!(failure.path, tree.path().join("v1/a/loop")),
            Ok(candidate) => panic!("expected a walk failure, got {}", candidate.relative_key()),
        }
        let rest: Vec<String> = items[1..].iter().map(|c| c.as_ref().unwrap().relative_key()).collect();
        assert_eq!(rest, vec!["v1/a/x.rs", "v1/z.rs"]);
    }
}
