use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Value, json};
use tempfile::TempDir;
use treeload_scan::{
    JsonLoader, LoadConfig, LoadError, LoadOptions, Loader, ModuleCache, Node, Pattern,
    Transform, TreeLoader, load_tree,
};

fn write_module(path: &Path, name: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, json!({ "module": name }).to_string()).unwrap();
}

/// modules/
///   module1.json, module2.json, notes.txt
///   dir1/module3.json
///   dir1/dir2/module4.json
///   dir.a.b.c/module5.json
///   excluded/module6.json
///   excluded/not_excluded/module7.json
fn create_recursive_demo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write_module(&root.join("module1.json"), "module1");
    write_module(&root.join("module2.json"), "module2");
    fs::write(root.join("notes.txt"), "not a module").unwrap();
    write_module(&root.join("dir1/module3.json"), "module3");
    write_module(&root.join("dir1/dir2/module4.json"), "module4");
    write_module(&root.join("dir.a.b.c/module5.json"), "module5");
    write_module(&root.join("excluded/module6.json"), "module6");
    write_module(&root.join("excluded/not_excluded/module7.json"), "module7");

    temp
}

fn sorted_keys(branch: &treeload_scan::Branch<Value>) -> Vec<&str> {
    let mut keys: Vec<_> = branch.keys().collect();
    keys.sort_unstable();
    keys
}

#[test]
fn test_simple_directory_keys() {
    let temp = create_recursive_demo();
    let modules = load_tree(temp.path(), &LoadConfig::new(), JsonLoader).unwrap();

    assert_eq!(sorted_keys(&modules), vec!["module1", "module2"]);
    assert_eq!(**modules.leaf("module1").unwrap(), json!({ "module": "module1" }));
}

#[test]
fn test_identity_with_direct_load() {
    let temp = create_recursive_demo();
    let cache = ModuleCache::new(JsonLoader);

    let modules = load_tree(temp.path(), &LoadConfig::recursive(), &cache).unwrap();
    let module1 = cache.load(&temp.path().join("module1.json")).unwrap();
    let module4 = cache.load(&temp.path().join("dir1/dir2/module4.json")).unwrap();

    assert!(Arc::ptr_eq(modules.leaf("module1").unwrap(), &module1));
    let nested = modules.lookup(["dir1", "dir2", "module4"]).unwrap();
    assert!(Arc::ptr_eq(nested.as_leaf().unwrap(), &module4));
}

#[test]
fn test_identity_across_two_loads() {
    let temp = create_recursive_demo();
    let cache = ModuleCache::new(JsonLoader);

    // Direct load first, tree second: the tree reuses the cached payload.
    let module2 = cache.load(&temp.path().join("module2.json")).unwrap();
    let first = load_tree(temp.path(), &LoadConfig::new(), &cache).unwrap();
    let second = load_tree(temp.path(), &LoadConfig::new(), &cache).unwrap();

    assert!(Arc::ptr_eq(first.leaf("module2").unwrap(), &module2));
    assert!(Arc::ptr_eq(first.leaf("module1").unwrap(), second.leaf("module1").unwrap()));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_caller_excludes_itself() {
    let temp = TempDir::new().unwrap();
    write_module(&temp.path().join("app.json"), "app");
    write_module(&temp.path().join("module1.json"), "module1");
    write_module(&temp.path().join("module2.json"), "module2");

    let config = LoadConfig::builder()
        .caller(temp.path().join("app.json"))
        .build()
        .unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

    assert_eq!(sorted_keys(&modules), vec!["module1", "module2"]);
    assert!(!modules.contains_key("app"));
}

#[test]
fn test_recursive_shape() {
    let temp = create_recursive_demo();
    let config = LoadConfig::builder()
        .recursive(true)
        .exclude_dirs(Pattern::regex("^excluded.*$").unwrap())
        .build()
        .unwrap();

    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

    assert_eq!(
        sorted_keys(&modules),
        vec!["dir.a.b.c", "dir1", "module1", "module2"]
    );
    let dir1 = modules.branch("dir1").unwrap();
    assert_eq!(sorted_keys(dir1), vec!["dir2", "module3"]);
    let dir2 = dir1.branch("dir2").unwrap();
    assert_eq!(sorted_keys(dir2), vec!["module4"]);
    assert_eq!(
        **dir1.leaf("module3").unwrap(),
        json!({ "module": "module3" })
    );
}

#[test]
fn test_excluded_directory_hides_descendants() {
    let temp = create_recursive_demo();
    let config = LoadConfig::builder()
        .recursive(true)
        .exclude_dirs(Pattern::regex("^excluded$").unwrap())
        .build()
        .unwrap();

    let tree = TreeLoader::new(JsonLoader).load(temp.path(), &config).unwrap();

    assert!(!tree.root.contains_key("excluded"));
    // not_excluded does not match the pattern but lives inside an excluded directory.
    let json = serde_json::to_string(&tree.root).unwrap();
    assert!(!json.contains("module6"));
    assert!(!json.contains("module7"));
    assert_eq!(tree.stats.files_loaded, 5);
}

#[test]
fn test_dotted_directory_is_one_key() {
    let temp = create_recursive_demo();
    let modules = load_tree(temp.path(), &LoadConfig::recursive(), JsonLoader).unwrap();

    let dotted = modules.branch("dir.a.b.c").unwrap();
    assert_eq!(
        **dotted.leaf("module5").unwrap(),
        json!({ "module": "module5" })
    );
    assert!(!modules.contains_key("dir"));
    assert!(modules.lookup(["dir", "a", "b", "c"]).is_none());
}

#[test]
fn test_map_renames_and_rewraps() {
    let temp = TempDir::new().unwrap();
    write_module(&temp.path().join("module1.json"), "module1");
    write_module(&temp.path().join("module2.json"), "module2");

    let data: HashMap<&str, &str> = HashMap::from([
        ("module1", "data for module1"),
        ("module2", "data for module2"),
    ]);
    let construct = |template: &Value, data: &str| json!({ "template": template, "data": data });

    let config = LoadConfig::builder()
        .map(Transform::new(move |name, node| {
            let node = match node {
                Node::Leaf(template) => {
                    let data = data.get(name.as_str()).copied().unwrap_or_default();
                    Node::leaf(construct(&*template, data))
                }
                branch => branch,
            };
            (format!("_{name}").into(), node)
        }))
        .build()
        .unwrap();

    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

    assert_eq!(sorted_keys(&modules), vec!["_module1", "_module2"]);
    assert_eq!(
        **modules.leaf("_module1").unwrap(),
        construct(&json!({ "module": "module1" }), "data for module1")
    );
    assert_eq!(
        **modules.leaf("_module2").unwrap(),
        construct(&json!({ "module": "module2" }), "data for module2")
    );
}

#[test]
fn test_map_skips_directories_unless_enabled() {
    let temp = create_recursive_demo();
    let prefix = || Transform::rename(|name| format!("_{name}").into());

    let config = LoadConfig::builder()
        .recursive(true)
        .map(prefix())
        .build()
        .unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();
    assert!(modules.contains_key("dir1"));
    assert!(modules.branch("dir1").unwrap().contains_key("_module3"));

    let config = LoadConfig::builder()
        .recursive(true)
        .map(prefix())
        .map_dirs(true)
        .build()
        .unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();
    assert!(modules.contains_key("_dir1"));
    assert!(modules.lookup(["_dir1", "_dir2", "_module4"]).is_some());
}

#[test]
fn test_non_recursive_default_omits_directories() {
    let temp = create_recursive_demo();
    let modules = load_tree(temp.path(), &LoadConfig::default(), JsonLoader).unwrap();

    for dir in ["dir1", "dir.a.b.c", "excluded"] {
        assert!(!modules.contains_key(dir), "{dir} should be absent");
    }
    assert!(modules.iter().all(|(_, node)| node.is_leaf()));
}

#[test]
fn test_empty_directory() {
    let temp = TempDir::new().unwrap();
    let modules = load_tree(temp.path(), &LoadConfig::recursive(), JsonLoader).unwrap();
    assert!(modules.is_empty());

    // Only unloadable content still yields an empty branch.
    fs::write(temp.path().join("readme.md"), "# nothing").unwrap();
    fs::create_dir(temp.path().join("empty")).unwrap();
    let modules = load_tree(temp.path(), &LoadConfig::new(), JsonLoader).unwrap();
    assert!(modules.is_empty());
}

#[test]
fn test_empty_subdirectory_is_empty_branch() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("empty")).unwrap();

    let modules = load_tree(temp.path(), &LoadConfig::recursive(), JsonLoader).unwrap();
    assert!(modules.branch("empty").unwrap().is_empty());
}

#[test]
fn test_file_patterns() {
    let temp = create_recursive_demo();
    write_module(&temp.path().join("module1_test.json"), "test");

    let config = LoadConfig::builder()
        .include_files(Pattern::glob("module*").unwrap())
        .exclude_files(Pattern::regex("_test").unwrap())
        .build()
        .unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

    assert_eq!(sorted_keys(&modules), vec!["module1", "module2"]);
}

#[test]
fn test_include_dirs() {
    let temp = create_recursive_demo();
    let config = LoadConfig::builder()
        .recursive(true)
        .include_dirs(Pattern::predicate(|name| name.starts_with("dir")))
        .build()
        .unwrap();

    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();
    assert_eq!(
        sorted_keys(&modules),
        vec!["dir.a.b.c", "dir1", "module1", "module2"]
    );
}

#[test]
fn test_missing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let err = load_tree(&missing, &LoadConfig::new(), JsonLoader).unwrap_err();
    assert!(matches!(&err, LoadError::NotFound { path } if *path == missing));

    let config = LoadConfig::builder().throw_no_dir(false).build().unwrap();
    let modules = load_tree(&missing, &config, JsonLoader).unwrap();
    assert!(modules.is_empty());
}

#[test]
fn test_root_is_a_file() {
    let temp = create_recursive_demo();
    let err = load_tree(temp.path().join("module1.json"), &LoadConfig::new(), JsonLoader)
        .unwrap_err();
    assert!(matches!(err, LoadError::NotADirectory { .. }));
}

#[test]
fn test_broken_file_aborts_whole_tree() {
    let temp = create_recursive_demo();
    fs::write(temp.path().join("dir1/dir2/broken.json"), "{ nope").unwrap();

    let err = load_tree(temp.path(), &LoadConfig::recursive(), JsonLoader).unwrap_err();
    match err {
        LoadError::Load { path, .. } => assert!(path.ends_with("broken.json")),
        other => panic!("expected load error, got {other:?}"),
    }
}

#[test]
fn test_index_as_parent() {
    let temp = TempDir::new().unwrap();
    write_module(&temp.path().join("index.json"), "root index");
    write_module(&temp.path().join("plugin/index.json"), "plugin index");
    write_module(&temp.path().join("plugin/helper.json"), "helper");
    write_module(&temp.path().join("plain/helper.json"), "helper");

    let config = LoadConfig::builder()
        .recursive(true)
        .index_as_parent(true)
        .build()
        .unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

    // The root never collapses; its index stays an ordinary entry.
    assert!(modules.leaf("index").is_some());
    assert_eq!(
        **modules.leaf("plugin").unwrap(),
        json!({ "module": "plugin index" })
    );
    assert!(modules.branch("plain").unwrap().contains_key("helper"));
}

#[test]
fn test_options_file_drives_load() {
    let temp = create_recursive_demo();
    let options = LoadOptions::from_toml(
        r#"
        recursive = true
        exclude_dirs = { globs = ["excluded*", "dir.*"] }
        "#,
    )
    .unwrap();

    let config = options.into_config::<Value>().unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();
    assert_eq!(sorted_keys(&modules), vec!["dir1", "module1", "module2"]);
}

#[test]
fn test_tree_serializes_to_nested_json() {
    let temp = create_recursive_demo();
    let config = LoadConfig::builder()
        .recursive(true)
        .exclude_dirs(Pattern::regex("^excluded").unwrap())
        .build()
        .unwrap();
    let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

    assert_eq!(
        serde_json::to_value(&modules).unwrap(),
        json!({
            "dir.a.b.c": { "module5": { "module": "module5" } },
            "dir1": {
                "dir2": { "module4": { "module": "module4" } },
                "module3": { "module": "module3" }
            },
            "module1": { "module": "module1" },
            "module2": { "module": "module2" }
        })
    );
}

#[test]
fn test_tree_loader_exposes_its_cache() {
    let temp = create_recursive_demo();
    let loader = TreeLoader::new(ModuleCache::new(JsonLoader));

    let tree = loader.load(temp.path(), &LoadConfig::recursive()).unwrap();

    assert_eq!(loader.loader().len() as u64, tree.stats.files_loaded);
    assert!(loader.loader().contains(&temp.path().join("excluded/not_excluded/module7.json")));
    let module1 = loader.loader().get(&temp.path().join("module1.json")).unwrap();
    assert!(Arc::ptr_eq(tree.root.leaf("module1").unwrap(), &module1));
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use std::os::unix::fs::symlink;

    fn with_dangling_link() -> TempDir {
        let temp = TempDir::new().unwrap();
        write_module(&temp.path().join("a.json"), "a");
        write_module(&temp.path().join("b.json"), "b");
        symlink(temp.path().join("nowhere"), temp.path().join("stale.md")).unwrap();
        symlink(temp.path().join("gone.json"), temp.path().join("stale.json")).unwrap();
        temp
    }

    #[test]
    fn test_dangling_link_is_skipped() {
        let temp = with_dangling_link();

        let tree = TreeLoader::new(JsonLoader)
            .load(temp.path(), &LoadConfig::new())
            .unwrap();

        assert_eq!(sorted_keys(&tree.root), vec!["a", "b"]);
        assert_eq!(tree.stats.entries_skipped, 2);
    }

    #[test]
    fn test_dangling_link_keeps_siblings_without_throw_no_dir() {
        let temp = with_dangling_link();
        let config = LoadConfig::builder().throw_no_dir(false).build().unwrap();

        let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();
        assert_eq!(sorted_keys(&modules), vec!["a", "b"]);
    }

    #[test]
    fn test_load_error_inside_directory_is_not_swallowed_without_throw_no_dir() {
        let temp = with_dangling_link();
        fs::write(temp.path().join("c.json"), "{ nope").unwrap();
        let config = LoadConfig::builder().throw_no_dir(false).build().unwrap();

        let err = load_tree(temp.path(), &config, JsonLoader).unwrap_err();
        assert!(matches!(err, LoadError::Load { .. }));
    }

    #[test]
    fn test_linked_directory_is_a_branch() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        fs::write(temp.path().join("real/m.json"), "1").unwrap();
        symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let cache = ModuleCache::new(JsonLoader);
        let modules = load_tree(temp.path(), &LoadConfig::recursive(), &cache).unwrap();

        assert_eq!(
            serde_json::to_value(&modules).unwrap(),
            json!({ "link": { "m": 1 }, "real": { "m": 1 } })
        );
        // Both keys share one payload through the canonical path.
        let through_link = modules.lookup(["link", "m"]).unwrap().as_leaf().unwrap();
        let direct = modules.lookup(["real", "m"]).unwrap().as_leaf().unwrap();
        assert!(Arc::ptr_eq(through_link, direct));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_linked_file_is_a_leaf() {
        let temp = TempDir::new().unwrap();
        write_module(&temp.path().join("module1.json"), "module1");
        symlink(temp.path().join("module1.json"), temp.path().join("alias.json")).unwrap();

        let modules = load_tree(temp.path(), &LoadConfig::new(), JsonLoader).unwrap();

        assert_eq!(sorted_keys(&modules), vec!["alias", "module1"]);
        assert_eq!(**modules.leaf("alias").unwrap(), json!({ "module": "module1" }));
    }

    #[test]
    fn test_caller_inside_linked_directory() {
        let temp = TempDir::new().unwrap();
        let shared = temp.path().join("shared");
        let root = temp.path().join("root");
        write_module(&shared.join("app.json"), "app");
        write_module(&shared.join("module1.json"), "module1");
        fs::create_dir(&root).unwrap();
        symlink(&shared, root.join("link")).unwrap();

        let config = LoadConfig::builder()
            .recursive(true)
            .caller(root.join("link/app.json"))
            .build()
            .unwrap();
        let modules = load_tree(&root, &config, JsonLoader).unwrap();

        assert_eq!(sorted_keys(modules.branch("link").unwrap()), vec!["module1"]);
    }

    #[test]
    fn test_link_to_caller_is_excluded() {
        let temp = TempDir::new().unwrap();
        write_module(&temp.path().join("app.json"), "app");
        write_module(&temp.path().join("module1.json"), "module1");
        symlink(temp.path().join("app.json"), temp.path().join("app_link.json")).unwrap();

        let config = LoadConfig::builder()
            .caller(temp.path().join("app.json"))
            .build()
            .unwrap();
        let modules = load_tree(temp.path(), &config, JsonLoader).unwrap();

        assert_eq!(sorted_keys(&modules), vec!["module1"]);
    }

    #[test]
    fn test_link_back_to_ancestor_is_a_cycle() {
        let temp = TempDir::new().unwrap();
        write_module(&temp.path().join("sub/module1.json"), "module1");
        symlink(temp.path(), temp.path().join("sub/back")).unwrap();

        let err = load_tree(temp.path(), &LoadConfig::recursive(), JsonLoader).unwrap_err();
        match err {
            LoadError::SymlinkCycle { path } => assert!(path.ends_with("sub/back")),
            other => panic!("expected symlink cycle, got {other:?}"),
        }
    }
}
