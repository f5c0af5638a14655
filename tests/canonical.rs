use flatinc::{FlatincError, IncludeKind, preprocess};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn create_sources() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path();

    write(
        &sources.join("a.cpp"),
        "// this comment before include\n\
         #include \"dir1/b.h\"\n\
         // text between b.h and c.h\n\
         #include \"dir1/d.h\"\n\
         \n\
         int SayHello() {\n\
         \x20   cout << \"hello, world!\" << endl;\n\
         #   include<dummy.txt>\n\
         }\n",
    );
    write(
        &sources.join("dir1/b.h"),
        "// text from b.h before include\n\
         #include \"subdir/c.h\"\n\
         // text from b.h after include",
    );
    write(
        &sources.join("dir1/subdir/c.h"),
        "// text from c.h before include\n\
         #include <std1.h>\n\
         // text from c.h after include\n",
    );
    write(
        &sources.join("dir1/d.h"),
        "// text from d.h before include\n\
         #include \"lib/std2.h\"\n\
         // text from d.h after include\n",
    );
    write(&sources.join("include1/std1.h"), "// std1\n");
    write(&sources.join("include2/lib/std2.h"), "// std2\n");

    temp_dir
}

#[test]
fn test_nested_expansion_until_unresolved_include() {
    let temp_dir = create_sources();
    let sources = temp_dir.path();
    let out = sources.join("a.in");
    let include_dirs = vec![sources.join("include1"), sources.join("include2")];

    let err = preprocess(&sources.join("a.cpp"), &out, &include_dirs).unwrap_err();
    match err {
        FlatincError::UnresolvedInclude {
            include,
            kind,
            file,
            line,
        } => {
            assert_eq!(include, "dummy.txt");
            assert_eq!(kind, IncludeKind::System);
            assert_eq!(file, sources.join("a.cpp"));
            assert_eq!(line, 8);
        }
        other => panic!("unexpected error: {other}"),
    }

    let expected = "// this comment before include\n\
                    // text from b.h before include\n\
                    // text from c.h before include\n\
                    // std1\n\
                    // text from c.h after include\n\
                    // text from b.h after include\n\
                    // text between b.h and c.h\n\
                    // text from d.h before include\n\
                    // std2\n\
                    // text from d.h after include\n\
                    \n\
                    int SayHello() {\n\
                    \x20   cout << \"hello, world!\" << endl;\n";
    assert_eq!(fs::read_to_string(&out).unwrap(), expected);
}

#[test]
fn test_nested_expansion_succeeds_once_resolvable() {
    let temp_dir = create_sources();
    let sources = temp_dir.path();
    write(&sources.join("include2/dummy.txt"), "// dummy\n");
    let out = sources.join("a.in");
    let include_dirs = vec![sources.join("include1"), sources.join("include2")];

    preprocess(&sources.join("a.cpp"), &out, &include_dirs).unwrap();
    let output = fs::read_to_string(&out).unwrap();
    assert!(output.ends_with("    cout << \"hello, world!\" << endl;\n// dummy\n}\n"));
}

#[test]
fn test_missing_search_dir_fails_nested_include() {
    let temp_dir = create_sources();
    let sources = temp_dir.path();
    let out = sources.join("a.in");

    let err = preprocess(&sources.join("a.cpp"), &out, &[sources.join("include1")]).unwrap_err();
    assert!(matches!(
        &err,
        FlatincError::UnresolvedInclude { include, file, line: 2, .. }
            if include == "lib/std2.h" && *file == sources.join("dir1/d.h")
    ));
}
