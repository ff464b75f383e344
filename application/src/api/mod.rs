//! GraphQL API definitions.
//!
//! The API is described as [`Fragment`]s composed into a single contract:
//! the root operations along with the `entries` and `repositories` domains.
//! The executable [`Schema`] is verified to conform to that contract.

pub mod comment;
pub mod composer;
pub mod entry;
mod mutation;
mod query;
pub mod repository;
mod subscription;
pub mod user;
pub mod vote;

use common::DateTime;

use self::composer::{Composition, Conflicts, Fragment};

pub use self::{
    comment::Comment,
    entry::Entry,
    mutation::Mutation,
    query::{FeedType, Query},
    repository::Repository,
    subscription::Subscription,
    user::User,
    vote::Vote,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

/// Resolver of a composed field: name of the GraphQL object resolving it.
///
/// The composed resolvers only record which object is expected to resolve
/// every field, so the executable [`Schema`] can be checked against them.
/// Dispatching itself is done by the statically defined [`juniper`] objects.
pub type Resolver = &'static str;

/// Type definitions of the `root` [`Fragment`].
const ROOT_TYPE_DEFS: &str = r"
    schema {
      query: Query
      mutation: Mutation
      subscription: Subscription
    }

    enum FeedType {
      HOT
      NEW
      TOP
    }

    enum VoteType {
      UP
      DOWN
      CANCEL
    }

    type Query {
      feed(type: FeedType!, offset: Int, limit: Int): [Entry]
      entry(repoFullName: String!): Entry
      currentUser: User
    }

    type Mutation {
      submitRepository(repoFullName: String!): Entry
      vote(repoFullName: String!, type: VoteType!): Entry
      submitComment(repoFullName: String!, commentContent: String!): Comment
    }

    type Subscription {
      commentAdded(repoFullName: String!): Comment
    }
";

/// Returns the `root` [`Fragment`] describing the root operations.
fn root() -> Fragment<Resolver> {
    fragment(
        "root",
        ROOT_TYPE_DEFS,
        &[
            ("Query", &["feed", "entry", "currentUser"]),
            ("Mutation", &["submitRepository", "vote", "submitComment"]),
            ("Subscription", &["commentAdded"]),
        ],
    )
}

/// Creates a new [`Fragment`] with the provided `objects` fields resolved by
/// the GraphQL objects of the same name.
fn fragment(
    name: &str,
    type_defs: &str,
    objects: &[(Resolver, &[&str])],
) -> Fragment<Resolver> {
    objects.iter().fold(
        Fragment::new(name, type_defs),
        |fragment, &(ty, fields)| {
            fields
                .iter()
                .fold(fragment, |fragment, &field| fragment.resolve(ty, field, ty))
        },
    )
}

/// Composes the `root`, `entries` and `repositories` [`Fragment`]s.
///
/// # Errors
///
/// If the [`Fragment`]s don't fit together.
pub fn composition() -> Result<Composition<Resolver>, composer::Error> {
    composer::compose(
        [root(), entry::fragment(), repository::fragment()],
        Conflicts::Reject,
    )
}

/// Creates the executable [`Schema`].
///
/// # Errors
///
/// If the [`Fragment`]s don't fit together, or the [`Schema`] doesn't conform
/// to their [`composition()`].
pub fn schema() -> Result<Schema, composer::Error> {
    let composition = composition()?;
    let schema = Schema::new(Query, Mutation, Subscription);
    composition.verify(&schema.as_sdl())?;
    Ok(schema)
}

/// Converts the provided [`DateTime`] into milliseconds since the Unix epoch.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond timestamps fit into `f64` mantissa"
)]
fn millis(at: DateTime) -> f64 {
    at.unix_timestamp_millis() as f64
}

#[cfg(test)]
pub(crate) mod spec {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use common::operations::Insert;
    use futures::{FutureExt as _, StreamExt as _};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{json, Value};
    use service::{
        domain,
        infra::{Broadcast, Database as _, Memory},
    };

    use super::{composition, schema, Subscription};
    use crate::{Context, Service};

    const SECRET: &[u8] = b"test-secret";

    pub(crate) fn config() -> service::Config {
        service::Config::hs256(SECRET, Duration::ZERO)
    }

    pub(crate) fn token(login: &str) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        jsonwebtoken::encode(
            &Header::default(),
            &json!({ "sub": login, "exp": exp }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    async fn service(catalog: &[&str]) -> Service {
        let service = Service::new(config(), Memory::new(), Broadcast::default());
        for name in catalog {
            service
                .database()
                .execute(Insert(domain::Repository {
                    full_name: domain::repository::FullName::new(*name)
                        .unwrap(),
                    description: Some(format!("About {name}")),
                    stargazers_count: 42,
                    open_issues_count: None,
                }))
                .await
                .unwrap();
        }
        service
    }

    fn context(service: &Service, login: Option<&str>) -> Context {
        let mut req = http::Request::builder();
        if let Some(login) = login {
            req = req.header(
                http::header::AUTHORIZATION,
                format!("Bearer {}", token(login)),
            );
        }
        let (parts, ()) = req.body(()).unwrap().into_parts();
        Context::new(service.clone(), parts)
    }

    /// Executes the provided GraphQL `query` returning its data along with
    /// the codes of the occurred errors.
    async fn execute(
        service: &Service,
        login: Option<&str>,
        query: &str,
    ) -> (Value, Vec<String>) {
        let schema = schema().unwrap();
        let ctx = context(service, login);
        let (data, errors) = juniper::execute(
            query,
            None,
            &schema,
            &juniper::Variables::new(),
            &ctx,
        )
        .await
        .unwrap();

        let codes = errors
            .iter()
            .map(|e| {
                let e = serde_json::to_value(e).unwrap();
                e["extensions"]["code"].as_str().unwrap().to_owned()
            })
            .collect();
        (serde_json::to_value(&data).unwrap(), codes)
    }

    async fn submit(service: &Service, login: &str, name: &str) {
        let (_, errors) = execute(
            service,
            Some(login),
            &format!(r#"mutation {{ submitRepository(repoFullName: "{name}") {{ id }} }}"#),
        )
        .await;
        assert_eq!(errors, Vec::<String>::new(), "submitting {name}");
    }

    #[test]
    fn composes_conforming_schema() {
        let composition = composition().unwrap();
        _ = schema().unwrap();

        for ty in composition.object_types() {
            for field in composition.fields(ty) {
                assert_eq!(
                    composition.resolver(ty, field),
                    Some(&ty),
                    "`{ty}.{field}` must be resolved",
                );
            }
        }
        assert_eq!(composition.resolved_by("Query", "feed"), Some("root"));
        assert_eq!(composition.resolved_by("Entry", "vote"), Some("entries"));
        assert_eq!(
            composition.resolved_by("User", "login"),
            Some("repositories"),
        );
        assert!(composition.sdl().contains(
            "  feed(type: FeedType!, offset: Int, limit: Int): [Entry]\n",
        ));
    }

    #[tokio::test]
    async fn feed_clamps_limit() {
        let names = (0..12).map(|i| format!("owner/repo-{i}")).collect::<Vec<_>>();
        let service =
            service(&names.iter().map(String::as_str).collect::<Vec<_>>())
                .await;
        for name in &names {
            submit(&service, "octocat", name).await;
        }

        for (args, expected) in [
            ("", 10),
            ("limit: 50", 10),
            ("limit: 0", 10),
            ("limit: -1", 10),
            ("limit: 3", 3),
            ("offset: 10", 2),
            ("offset: -4, limit: 2", 2),
        ] {
            let (data, errors) = execute(
                &service,
                None,
                &format!("{{ feed(type: NEW, {args}) {{ id }} }}"),
            )
            .await;

            assert_eq!(errors, Vec::<String>::new());
            assert_eq!(
                data["feed"].as_array().unwrap().len(),
                expected,
                "args: {args}",
            );
        }

        let (data, _) =
            execute(&service, None, "{ feed(type: NEW, limit: 1) { id } }")
                .await;
        assert_eq!(data, json!({ "feed": [{ "id": 12 }] }));
    }

    #[tokio::test]
    async fn entry_is_null_when_absent() {
        let service = service(&["a/b"]).await;

        for name in ["a/b", "c/d", "malformed"] {
            let (data, errors) = execute(
                &service,
                None,
                &format!(r#"{{ entry(repoFullName: "{name}") {{ id }} }}"#),
            )
            .await;

            assert_eq!(errors, Vec::<String>::new());
            assert_eq!(data, json!({ "entry": null }), "name: {name}");
        }
    }

    #[tokio::test]
    async fn returns_current_user() {
        let service = service(&[]).await;
        let query = "{ currentUser { login avatar_url html_url } }";

        let (data, _) = execute(&service, Some("octocat"), query).await;
        assert_eq!(
            data,
            json!({
                "currentUser": {
                    "login": "octocat",
                    "avatar_url": "https://github.com/octocat.png",
                    "html_url": "https://github.com/octocat",
                },
            }),
        );

        let (data, errors) = execute(&service, None, query).await;
        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(data, json!({ "currentUser": null }));
    }

    #[tokio::test]
    async fn mutations_require_authentication() {
        let service = service(&["a/b"]).await;
        let mut events = Subscription
            .comment_added("a/b".into(), &context(&service, None))
            .await
            .map_err(|e| e.to_string())
            .unwrap();

        for mutation in [
            r#"mutation { submitRepository(repoFullName: "a/b") { id } }"#,
            r#"mutation { vote(repoFullName: "a/b", type: UP) { id } }"#,
            r#"mutation {
                 submitComment(repoFullName: "a/b", commentContent: "Hi") {
                   id
                 }
               }"#,
        ] {
            let (_, errors) = execute(&service, None, mutation).await;

            assert_eq!(errors, ["UNAUTHORIZED"], "{mutation}");
        }

        let (data, _) =
            execute(&service, None, "{ feed(type: NEW) { id } }").await;
        assert_eq!(data, json!({ "feed": [] }));
        assert!(events.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn submits_repository() {
        let service = service(&["apollographql/GitHunt-API"]).await;

        let (data, errors) = execute(
            &service,
            Some("octocat"),
            r#"mutation {
                 submitRepository(repoFullName: "apollographql/GitHunt-API") {
                   score
                   commentCount
                   postedBy { login }
                   vote { vote_value }
                   repository {
                     name
                     full_name
                     description
                     html_url
                     stargazers_count
                     open_issues_count
                     owner { login }
                   }
                 }
               }"#,
        )
        .await;

        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(
            data,
            json!({
                "submitRepository": {
                    "score": 1,
                    "commentCount": 0,
                    "postedBy": { "login": "octocat" },
                    "vote": { "vote_value": 1 },
                    "repository": {
                        "name": "GitHunt-API",
                        "full_name": "apollographql/GitHunt-API",
                        "description": "About apollographql/GitHunt-API",
                        "html_url":
                            "https://github.com/apollographql/GitHunt-API",
                        "stargazers_count": 42,
                        "open_issues_count": null,
                        "owner": { "login": "apollographql" },
                    },
                },
            }),
        );
    }

    #[tokio::test]
    async fn reports_missing_repository() {
        let service = service(&["a/b"]).await;
        let schema = schema().unwrap();
        let ctx = context(&service, Some("octocat"));

        let (_, errors) = juniper::execute(
            r#"mutation { submitRepository(repoFullName: "owner/doesnotexist") { id } }"#,
            None,
            &schema,
            &juniper::Variables::new(),
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].error().message(),
            r#"NotFound: repository "owner/doesnotexist""#,
        );
        assert_eq!(ctx.error_status_code(), http::StatusCode::NOT_FOUND);

        let (data, _) =
            execute(&service, None, "{ feed(type: NEW) { id } }").await;
        assert_eq!(data, json!({ "feed": [] }));
    }

    #[tokio::test]
    async fn passes_storage_failure_through() {
        let service = service(&["a/b", "c/d"]).await;
        submit(&service, "octocat", "a/b").await;
        service.database().exhaust_ids().await;
        let schema = schema().unwrap();

        for mutation in [
            r#"mutation { submitRepository(repoFullName: "c/d") { id } }"#,
            r#"mutation {
                 submitComment(repoFullName: "a/b", commentContent: "Hi") {
                   id
                 }
               }"#,
        ] {
            let ctx = context(&service, Some("octocat"));
            let (_, errors) = juniper::execute(
                mutation,
                None,
                &schema,
                &juniper::Variables::new(),
                &ctx,
            )
            .await
            .unwrap();

            assert_eq!(errors.len(), 1, "{mutation}");
            let error = serde_json::to_value(&errors[0]).unwrap();
            assert_eq!(error["message"], "IDs are exhausted", "{mutation}");
            assert_eq!(error["extensions"]["code"], "UPSTREAM_FAILURE");
            assert!(
                !error["extensions"]["backtrace"]
                    .as_array()
                    .unwrap()
                    .is_empty(),
                "{mutation}",
            );
            assert_eq!(
                ctx.error_status_code(),
                http::StatusCode::BAD_GATEWAY,
            );
        }
    }

    #[tokio::test]
    async fn votes_with_signed_effect() {
        let service = service(&["a/b"]).await;
        submit(&service, "octocat", "a/b").await;

        for (ty, score, value) in
            [("UP", 2, 1), ("DOWN", 0, -1), ("CANCEL", 1, 0), ("UP", 2, 1)]
        {
            let (data, errors) = execute(
                &service,
                Some("voter"),
                &format!(
                    r#"mutation {{
                         vote(repoFullName: "a/b", type: {ty}) {{
                           score
                           vote {{ vote_value }}
                         }}
                       }}"#,
                ),
            )
            .await;

            assert_eq!(errors, Vec::<String>::new());
            assert_eq!(
                data,
                json!({
                    "vote": { "score": score, "vote": { "vote_value": value } },
                }),
                "type: {ty}",
            );
        }

        let (_, errors) = execute(
            &service,
            Some("voter"),
            r#"mutation { vote(repoFullName: "c/d", type: UP) { id } }"#,
        )
        .await;
        assert_eq!(errors, ["NOT_FOUND"]);
    }

    #[tokio::test]
    async fn notifies_only_matching_subscribers() {
        let service = service(&["a/b", "c/d"]).await;
        submit(&service, "octocat", "a/b").await;
        let ctx = context(&service, None);
        let mut matching = Subscription
            .comment_added("a/b".into(), &ctx)
            .await
            .map_err(|e| e.to_string())
            .unwrap();
        let mut other = Subscription
            .comment_added("c/d".into(), &ctx)
            .await
            .map_err(|e| e.to_string())
            .unwrap();

        let (data, errors) = execute(
            &service,
            Some("commenter"),
            r#"mutation {
                 submitComment(repoFullName: "a/b", commentContent: "Nice!") {
                   content
                   repoName
                   postedBy { login }
                 }
               }"#,
        )
        .await;
        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(
            data,
            json!({
                "submitComment": {
                    "content": "Nice!",
                    "repoName": "a/b",
                    "postedBy": { "login": "commenter" },
                },
            }),
        );

        let comment = matching
            .next()
            .now_or_never()
            .flatten()
            .unwrap()
            .map_err(|e| e.to_string())
            .unwrap();
        assert_eq!(comment.content(), "Nice!");
        assert_eq!(comment.repo_name(), "a/b");
        assert!(matching.next().now_or_never().is_none(), "exactly once");
        assert!(other.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn rejects_invalid_comments() {
        let service = service(&["a/b"]).await;
        submit(&service, "octocat", "a/b").await;

        for (name, content, code) in [
            ("c/d", "Hi", "NOT_FOUND"),
            ("malformed", "Hi", "NOT_FOUND"),
            ("a/b", "  ", "INVALID_COMMENT_CONTENT"),
        ] {
            let (_, errors) = execute(
                &service,
                Some("octocat"),
                &format!(
                    r#"mutation {{
                         submitComment(
                           repoFullName: "{name}",
                           commentContent: "{content}",
                         ) {{ id }}
                       }}"#,
                ),
            )
            .await;

            assert_eq!(errors, [code], "name: {name}, content: {content:?}");
        }
    }

    #[tokio::test]
    async fn lists_entry_comments_newest_first() {
        let service = service(&["a/b"]).await;
        submit(&service, "octocat", "a/b").await;
        for content in ["First", "Second"] {
            let (_, errors) = execute(
                &service,
                Some("octocat"),
                &format!(
                    r#"mutation {{
                         submitComment(
                           repoFullName: "a/b",
                           commentContent: "{content}",
                         ) {{ id }}
                       }}"#,
                ),
            )
            .await;
            assert_eq!(errors, Vec::<String>::new());
        }

        let (data, _) = execute(
            &service,
            None,
            r#"{
                 entry(repoFullName: "a/b") {
                   commentCount
                   vote { vote_value }
                   comments(limit: 1) { content }
                 }
               }"#,
        )
        .await;

        assert_eq!(
            data,
            json!({
                "entry": {
                    "commentCount": 2,
                    "vote": { "vote_value": 0 },
                    "comments": [{ "content": "Second" }],
                },
            }),
        );
    }

    #[tokio::test]
    async fn rejects_malformed_subscription() {
        let service = service(&[]).await;
        let ctx = context(&service, None);

        let Err(err) = Subscription.comment_added("malformed".into(), &ctx).await
        else {
            panic!("subscription must fail");
        };

        assert_eq!(err.code, "INVALID_REPOSITORY_NAME");
        assert_eq!(ctx.error_status_code(), http::StatusCode::BAD_REQUEST);
    }
}
