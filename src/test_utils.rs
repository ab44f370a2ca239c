//! Shared fixtures for unit tests

pub(crate) const RULES: &str = r#"
[rules.listing]
tag = "a"
class = "review__link"

[rules.fields.artist]
tag = "div"
class = "Artist"

[rules.fields.album]
tag = "h1"
class = "Album"

[rules.fields.score]
tag = "div"
class = "Score"
child = "p"

[rules.fields.year]
tag = "time"
class = "Year"

[rules.fields.reviewer]
tag = "a"
class = "Byline"

[rules.fields.genre]
tag = "p"
class = "InfoSlice"
select = "nth"
index = 0
min-count = 3

[rules.fields.label]
tag = "p"
class = "InfoSlice"
select = "nth"
index = 1
min-count = 3

[rules.fields.review_date]
tag = "p"
class = "InfoSlice"
select = "nth"
index = 2
min-count = 3

[rules.fields.summary]
tag = "div"
class = "Dek"

[rules.fields.review_text]
tag = "div"
class = "body"
child = "p"
select = "concat"

[rules.fields.best_new]
tag = "p"
class = "BestNew"
"#;

pub(crate) fn config_text(origin: &str) -> String {
    format!(
        r#"
[site]
origin = "{origin}"

[harvest]
start-page = 1
end-page = 3
page-concurrency = 4
detail-concurrency = 2

[fetch]
timeout-ms = 1000
max-attempts = 3
backoff-base-ms = 10
backoff-max-ms = 100

[output]
database-path = "./reviews.db"
{RULES}"#
    )
}
