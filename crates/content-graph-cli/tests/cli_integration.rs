use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use jsonschema::JSONSchema;
use serde_json::Value;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|err| panic!("failed to canonicalize repo root: {err}"))
}

fn fixture_snapshot() -> PathBuf {
    repo_root().join("fixtures/catalog.json")
}

fn run_cg<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_cg"))
        .arg("--snapshot")
        .arg(fixture_snapshot())
        .args(args)
        .env_remove("CONTENT_GRAPH_LANGUAGE")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|err| panic!("failed to execute cg binary: {err}"))
}

fn run_json<I, S>(args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run_cg(args);
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "cg command failed (status={}):\nstdout:\n{}\nstderr:\n{}",
            output.status, stdout, stderr
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    serde_json::from_str(&stdout)
        .unwrap_or_else(|err| panic!("stdout is not valid JSON: {err}\nstdout:\n{stdout}"))
}

fn read_json_file(path: &Path) -> Value {
    let body = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read JSON file {}: {err}", path.display()));
    serde_json::from_str(&body)
        .unwrap_or_else(|err| panic!("failed to parse JSON file {}: {err}", path.display()))
}

fn validate_schema(schema_file: &str, instance: &Value) {
    let schema_path = repo_root().join("contracts/v1/schemas").join(schema_file);
    let schema_json = read_json_file(&schema_path);
    let compiled = JSONSchema::compile(&schema_json)
        .unwrap_or_else(|err| panic!("failed to compile schema {}: {err}", schema_path.display()));

    let errors = compiled
        .validate(instance)
        .err()
        .map(|iter| iter.map(|err| err.to_string()).collect::<Vec<_>>());
    if let Some(errors) = errors {
        panic!("schema validation failed for {}:\n{}", schema_file, errors.join("\n"));
    }
}

fn uids(list: &Value) -> Vec<String> {
    list["objects"]
        .as_array()
        .unwrap_or_else(|| panic!("missing objects array in payload: {list}"))
        .iter()
        .filter_map(|object| object["uid"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn info_reports_fingerprint_and_counts() {
    let info = run_json(["info"]);
    validate_schema("info.response.schema.json", &info);
    assert_eq!(info["api_contract_version"], "api.v1");
    assert_eq!(info["collections"]["media_objects"], 13);
    assert_eq!(info["collections"]["articles"], 1);

    let again = run_json(["info"]);
    assert_eq!(again["snapshot_id"], info["snapshot_id"]);
}

#[test]
fn get_movie_matches_the_media_contract() {
    let movie = run_json(["get", "--kind", "movie", "--uid", "m1"]);
    validate_schema("media.response.schema.json", &movie);
    validate_schema("object.response.schema.json", &movie);
    assert_eq!(movie["__typename"], "Movie");
    assert_eq!(movie["genres"]["objects"][0]["name"], "Sci-Fi");
    assert_eq!(movie["genres"]["count"], 1);
    assert_eq!(movie["contract_version"], "cli.v1");

    let by_external = run_json(["get", "--kind", "movie", "--external-id", "ext-m1"]);
    assert_eq!(by_external["uid"], "m1");
}

#[test]
fn request_flags_localize_and_filter() {
    let localized = run_json(["--language", "pt-PT", "get", "--kind", "movie", "--uid", "m1"]);
    assert_eq!(localized["title"], "Viagem Estelar");

    let premium =
        run_json(["--customer-types", "premium", "get", "--kind", "movie", "--uid", "m1"]);
    assert_eq!(premium["availability"]["objects"][0]["uid"], "av-premium");

    let hidden = run_cg(["--customer-types", "standard", "get", "--kind", "movie", "--uid", "m1"]);
    assert!(!hidden.status.success());
    let stderr = String::from_utf8_lossy(&hidden.stderr);
    assert!(stderr.contains("Movie not found: m1"), "stderr was {stderr}");
}

#[test]
fn environment_supplies_the_language() {
    let output = Command::new(env!("CARGO_BIN_EXE_cg"))
        .args(["get", "--kind", "genre", "--uid", "g1"])
        .env("CONTENT_GRAPH_SNAPSHOT", fixture_snapshot())
        .env("CONTENT_GRAPH_LANGUAGE", "pt-pt")
        .output()
        .unwrap_or_else(|err| panic!("failed to execute cg binary: {err}"));
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let genre: Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|err| panic!("invalid JSON: {err}"));
    assert_eq!(genre["name"], "Ficção Científica");
}

#[test]
fn list_commands_use_the_list_envelope() {
    let movies = run_json(["list", "--kind", "movie"]);
    validate_schema("list.response.schema.json", &movies);
    assert_eq!(uids(&movies), vec!["m1", "m2", "m3"]);
    assert_eq!(movies["hasNextPage"], false);

    let genres = run_json(["list", "--kind", "genre"]);
    validate_schema("list.response.schema.json", &genres);
    assert_eq!(genres["count"], 2);

    let by_genre = run_json(["list-by-genre", "--id", "g2"]);
    assert_eq!(by_genre["__typename"], "Genre");
    assert_eq!(uids(&by_genre["content"]), vec!["m2", "m3"]);

    let by_tag = run_json(["list-by-tag", "--id", "t1", "--kind", "movie"]);
    assert_eq!(by_tag["__typename"], "SkylarkTag");
    assert_eq!(by_tag["content"]["count"], 2);

    let unlistable = run_cg(["list", "--kind", "person"]);
    assert!(!unlistable.status.success());
}

#[test]
fn set_command_resolves_nested_and_referenced_sets() {
    let home = run_json(["set", "--id", "home"]);
    validate_schema("set.response.schema.json", &home);
    assert_eq!(home["type"], "PAGE");
    assert_eq!(home["content"]["objects"][0]["object"]["uid"], "set-scifi");
    assert_eq!(home["content"]["objects"][1]["object"]["__typename"], "LiveStream");

    let reference = run_json(["set", "--id", "ref-rail", "--no-follow"]);
    assert_eq!(reference["uid"], "ref-rail");

    let shallow = run_json(["set", "--id", "set-scifi", "--depth", "4"]);
    validate_schema("set.response.schema.json", &shallow);
    assert_eq!(shallow["content"], Value::Null);

    let cyclic = run_json(["set", "--id", "cycle-a"]);
    assert_eq!(cyclic["content"]["count"], 0);
}

#[test]
fn search_highlights_normalized_matches() {
    let results = run_json(["search", "--query", "spider-man"]);
    validate_schema("search.response.schema.json", &results);
    assert_eq!(results["total_count"], 2);
    let title = results["objects"][0]["title"].as_str().unwrap_or_default();
    assert!(title.contains(r#"<span class="search-highlight">Spider</span>"#), "title was {title}");
    assert_eq!(results["objects"][1]["_context"]["typename_highlight"], "Article");

    let limited = run_json(["search", "--query", "spider-man", "--limit", "1"]);
    assert_eq!(limited["total_count"], 2);
    assert_eq!(limited["objects"].as_array().map(Vec::len), Some(1));
}

#[test]
fn hierarchy_commands_nest_children_in_order() {
    let season = run_json(["season", "--uid", "s1"]);
    validate_schema("hierarchy.response.schema.json", &season);
    assert_eq!(uids(&season["episodes"]), vec!["e2", "e1", "e3"]);

    let brand = run_json(["brand", "--uid", "b1"]);
    validate_schema("hierarchy.response.schema.json", &brand);
    assert_eq!(uids(&brand["seasons"]), vec!["s1", "s2"]);
    assert_eq!(uids(&brand["seasons"]["objects"][1]["episodes"]), vec!["e4"]);
}

#[test]
fn person_credits_list_titles_per_credit() {
    let person = run_json(["person-credits", "--id", "p1"]);
    validate_schema("person-credits.response.schema.json", &person);
    assert_eq!(person["name"], "Ada Stone");
    assert_eq!(uids(&person["credits"]), vec!["c1", "c3"]);
    assert_eq!(uids(&person["credits"]["objects"][0]["movies"]), vec!["m1"]);
    assert_eq!(uids(&person["credits"]["objects"][0]["episodes"]), vec!["e1"]);
}

#[test]
fn missing_snapshot_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_cg"))
        .args(["--snapshot", "/nonexistent/catalog.json", "info"])
        .output()
        .unwrap_or_else(|err| panic!("failed to execute cg binary: {err}"));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read snapshot"), "stderr was {stderr}");
}
