#[cfg(test)]
mod tests {
    use crate::discovery::{
        transform, CandidateFile, CatalogLoader, LoadFailure, LoadOutcome, ModuleCatalog, ModuleLoader, RouteContext,
    };
    use axum::http::Method;
    use std::path::PathBuf;

    fn candidate(key: &str) -> CandidateFile {
        CandidateFile {
            full_path: PathBuf::from("/srv/api").join(key),
            relative_segments: key.split('/').map(str::to_string).collect(),
        }
    }

    fn load(catalog: &ModuleCatalog<()>, key: &str) -> LoadOutcome<()> {
        let candidate = candidate(key);
        let pattern = transform(&candidate.relative_segments).unwrap();
        CatalogLoader::new(catalog).load(&candidate, &pattern)
    }

    fn failure(outcome: LoadOutcome<()>) -> LoadFailure {
        match outcome {
            LoadOutcome::Failed { reason, .. } => reason,
            LoadOutcome::Loaded { unit } => panic!("expected failure, loaded {}", unit.source),
        }
    }

    fn users(ctx: &mut RouteContext<()>) -> anyhow::Result<()> {
        ctx.get(|| async { "list" }).post(|| async { "create" });
        Ok(())
    }

    #[test]
    fn test_loads_registered_module() {
        let catalog = ModuleCatalog::new().module("v1/users/index.rs", users);
        match load(&catalog, "v1/users/index.rs") {
            LoadOutcome::Loaded { unit } => {
                assert_eq!(unit.source, "v1/users/index.rs");
                let methods: Vec<Method> = unit.bindings.iter().map(|b| b.method.clone()).collect();
                assert_eq!(methods, vec![Method::GET, Method::POST]);
                assert!(unit.bindings.iter().all(|b| b.sub_path.is_empty()));
            }
            other => panic!("expected Loaded, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_module_is_missing_export() {
        let catalog = ModuleCatalog::new().module("v1/users/index.rs", users);
        let outcome = load(&catalog, "v1/orders.rs");
        match &outcome {
            LoadOutcome::Failed { path, .. } => assert_eq!(path, &PathBuf::from("/srv/api/v1/orders.rs")),
            _ => panic!("expected failure"),
        }
        assert_eq!(failure(outcome), LoadFailure::MissingExport);
    }

    #[test]
    fn test_invalid_export_reported_as_is() {
        let reason = LoadFailure::NotCallable { kind: "const".to_string() };
        let catalog: ModuleCatalog<()> = ModuleCatalog::new().invalid("v1/bad.rs", reason.clone());
        assert_eq!(failure(load(&catalog, "v1/bad.rs")), reason);
    }

    #[test]
    fn test_setup_error_is_isolated() {
        let catalog = ModuleCatalog::new().module("v1/db.rs", |_ctx: &mut RouteContext<()>| {
            Err(anyhow::anyhow!("pool unavailable").context("connecting"))
        });
        match failure(load(&catalog, "v1/db.rs")) {
            LoadFailure::SetupFailed { reason } => {
                assert!(reason.contains("connecting"));
                assert!(reason.contains("pool unavailable"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_panic_is_caught() {
        let catalog = ModuleCatalog::new().module("v1/boom.rs", |_ctx: &mut RouteContext<()>| -> anyhow::Result<()> {
            panic!("kaboom")
        });
        assert_eq!(failure(load(&catalog, "v1/boom.rs")), LoadFailure::Panicked { message: "kaboom".to_string() });

        let catalog = ModuleCatalog::new().module("v1/boom.rs", |_ctx: &mut RouteContext<()>| -> anyhow::Result<()> {
            panic!("code {}", 7)
        });
        assert_eq!(failure(load(&catalog, "v1/boom.rs")), LoadFailure::Panicked { message: "code 7".to_string() });
    }

    #[test]
    fn test_no_handlers() {
        let catalog = ModuleCatalog::new().module("v1/empty.rs", |_ctx: &mut RouteContext<()>| Ok(()));
        assert_eq!(failure(load(&catalog, "v1/empty.rs")), LoadFailure::NoHandlers);
    }

    #[test]
    fn test_invalid_sub_path_binding() {
        let catalog = ModuleCatalog::new().module("v1/users.rs", |ctx: &mut RouteContext<()>| {
            ctx.get(|| async { "ok" });
            ctx.on_path(Method::GET, "avatar", || async { "no slash" });
            Ok(())
        });
        match failure(load(&catalog, "v1/users.rs")) {
            LoadFailure::InvalidBinding { reason } => assert!(reason.contains("must start with '/'")),
            other => panic!("unexpected {:?}", other),
        }

        for bad in ["/a//b", "/:", "/[id]", "/{id}", "/*rest"] {
            let mut ctx = RouteContext::<()>::new();
            ctx.on_path(Method::GET, bad, || async { "x" });
            assert!(ctx.bindings().is_empty(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_sub_path_bindings() {
        let mut ctx = RouteContext::<()>::new();
        ctx.on_path(Method::GET, "/avatar", || async { "png" })
            .on_path(Method::PUT, "/:size", || async { "resized" })
            .delete(|| async { "gone" });

        let got: Vec<(Method, &str)> = ctx.bindings().iter().map(|b| (b.method.clone(), b.sub_path.as_str())).collect();
        assert_eq!(got, vec![(Method::GET, "/avatar"), (Method::PUT, "/:size"), (Method::DELETE, "")]);
    }

    #[test]
    fn test_sub_path_cannot_rebind_path_parameter() {
        let catalog = ModuleCatalog::new().module("v1/users/[id].rs", |ctx: &mut RouteContext<()>| {
            ctx.get(|| async { "user" });
            ctx.on_path(Method::GET, "/:id", || async { "again" });
            Ok(())
        });
        match failure(load(&catalog, "v1/users/[id].rs")) {
            LoadFailure::InvalidBinding { reason } => assert!(reason.contains("'id'")),
            other => panic!("unexpected {:?}", other),
        }

        // Fresh names are fine, repeats inside the sub path are not.
        let pattern = transform(&["v1", "users", "[id].rs"]).unwrap();
        let mut ctx = RouteContext::<()>::for_pattern(&pattern);
        ctx.on_path(Method::GET, "/:size", || async { "ok" });
        ctx.on_path(Method::GET, "/:a/x/:a", || async { "twice" });
        let subs: Vec<&str> = ctx.bindings().iter().map(|b| b.sub_path.as_str()).collect();
        assert_eq!(subs, vec!["/:size"]);
    }

    #[test]
    fn test_catalog_basics() {
        let catalog: ModuleCatalog<()> = ModuleCatalog::new();
        assert!(catalog.is_empty());

        let catalog = catalog.module("v1/a.rs", users).invalid("v1/b.rs", LoadFailure::MissingExport);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("v1/a.rs").is_some());
        assert!(catalog.get("v1/c.rs").is_none());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(LoadFailure::MissingExport.to_string(), "module does not export a `register` function");
        assert_eq!(
            LoadFailure::NotCallable { kind: "struct".into() }.to_string(),
            "`register` is a struct, not a function"
        );
    }
}
