use bn_cli::{
    cli::{Cli, Commands},
    commands::api::execute,
};
use bugninja_shared::cms_api::{CmsClient, CmsConfig, SlugLookup};
use clap::Parser;
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn client(api_url: &str) -> CmsClient {
    CmsClient::new(CmsConfig {
        api_url: api_url.to_string(),
        public_url: "https://cms.bugninja.ai".to_string(),
        token: None,
        slug_lookup: SlugLookup::Auto,
    })
    .expect("client")
}

#[test]
fn parses_global_overrides_after_subcommand() {
    let cli = Cli::try_parse_from([
        "bn-cli",
        "list-articles",
        "--page",
        "2",
        "--cms-url",
        "http://strapi:1337",
        "--slug-lookup",
        "scan",
    ])
    .expect("parse");

    assert_eq!(cli.cms.cms_url.as_deref(), Some("http://strapi:1337"));
    assert_eq!(cli.cms.slug_lookup, Some(SlugLookup::Scan));
    assert!(matches!(
        cli.command,
        Commands::ListArticles {
            page: 2,
            page_size: 10
        }
    ));
}

#[test]
fn rejects_unknown_slug_lookup() {
    assert!(Cli::try_parse_from(["bn-cli", "tags", "--slug-lookup", "guess"]).is_err());
}

#[tokio::test]
async fn media_url_uses_requested_origin() {
    let client = client("http://strapi:1337/");
    let cli = Cli::try_parse_from(["bn-cli", "media-url", "/uploads/a.png", "--context", "server"])
        .expect("parse");

    let output = execute(&client, cli.command).await.expect("media url");

    assert_eq!(output["url"], "http://strapi:1337/uploads/a.png");
    assert_eq!(output["context"], "server");
}

#[tokio::test]
async fn format_date_prints_long_form_and_rejects_garbage() {
    let client = client("http://localhost:1337");

    let output = execute(
        &client,
        Commands::FormatDate {
            iso: "2024-03-15T10:00:00.000Z".to_string(),
        },
    )
    .await
    .expect("format");
    assert_eq!(output["formatted"], "March 15, 2024");

    let err = execute(
        &client,
        Commands::FormatDate {
            iso: "yesterday".to_string(),
        },
    )
    .await
    .expect_err("invalid date");
    assert!(err.to_string().contains("yesterday"));
}

#[tokio::test]
async fn tags_are_read_from_cms() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(query_param("sort[0]", "name:asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "id": 3, "attributes": { "name": "Automation", "slug": "automation" } } ]
        })))
        .mount(&server)
        .await;

    let output = execute(&client(&server.uri()), Commands::Tags)
        .await
        .expect("tags");

    assert_eq!(output["tags"][0]["slug"], "automation");
}

#[tokio::test]
async fn missing_article_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("filters[slug][$eq]", "nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = execute(
        &client(&server.uri()),
        Commands::Article {
            slug: "nope".to_string(),
        },
    )
    .await
    .expect_err("not found");

    assert_eq!(err.to_string(), r#"Article with slug "nope" not found"#);
}

#[tokio::test]
async fn encoded_slug_argument_is_decoded_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("filters[slug][$eq]", "bugs & fixes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "id": 9, "attributes": { "slug": "bugs & fixes" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": 9, "attributes": { "title": "Bugs", "slug": "bugs & fixes" } }
        })))
        .mount(&server)
        .await;
    let cli = Cli::try_parse_from(["bn-cli", "article", "bugs%20%26%20fixes"]).expect("parse");

    let output = execute(&client(&server.uri()), cli.command)
        .await
        .expect("article");

    assert_eq!(output["id"], 9);
    assert_eq!(output["slug"], "bugs & fixes");
}
