//! HTML pages served by the query front end

use crate::storage::SearchResult;

/// The search form served on `GET /`
pub const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Sitespider search</title></head>
<body>
<h2>Search the index</h2>
<form method="post" action="/search">
<input type="text" name="query" size="40" autofocus>
<input type="submit" value="Search">
</form>
<p>Enter one to four words. Only pages containing every word are listed.</p>
</body>
</html>
"#;

/// Escapes text for inclusion in HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n<p><a href=\"/\">New search</a></p>\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Renders the ranked result list for a query
pub fn results_page(query: &str, results: &[SearchResult]) -> String {
    let mut body = format!("<h3>Results for: {}</h3>\n", escape_html(query));

    if results.is_empty() {
        body.push_str("<p>Nothing found.</p>");
    } else {
        body.push_str("<ol>\n");
        for result in results {
            let url = escape_html(&result.url);
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a> ({})</li>\n",
                url, url, result.relevance
            ));
        }
        body.push_str("</ol>");
    }

    page("Search results", &body)
}

/// Renders an error page with a message
pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<h3>{}</h3>\n<p>{}</p>",
        escape_html(title),
        escape_html(message)
    );
    page(title, &body)
}
