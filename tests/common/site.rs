//! A fake album site served by wiremock

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Markup the site serves for a missing album
pub const NOT_FOUND_HTML: &str =
    r#"<html><body><div id="frontpage"><h1>404 Not Found</h1></div></body></html>"#;

/// Album site with album pages, image pages and image files
pub struct FakeSite {
    pub server: MockServer,
}

impl FakeSite {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Site root with a trailing slash, as the config expects it
    pub fn base_url(&self) -> String {
        format!("{}/", self.server.uri())
    }

    /// Absolute album page URL for `slug`
    pub fn album_url(&self, slug: &str) -> String {
        format!("{}/albums/{slug}/", self.server.uri())
    }

    /// Serve an album whose pictures all resolve and download
    ///
    /// Image pages are linked relative to the site root; direct links are absolute.
    /// Returns the album page URL.
    pub async fn mount_album(&self, slug: &str, name: &str, pictures: usize) -> String {
        let mut hrefs = Vec::with_capacity(pictures);
        for i in 1..=pictures {
            let page = format!("/albums/{slug}/pictures/{i}/");
            let image = format!("/images/{slug}/{i:03}.jpg");
            self.serve_html(&page, image_page_html(&format!("{}{image}", self.server.uri())))
                .await;
            Mock::given(method("GET"))
                .and(path(image.as_str()))
                .respond_with(
                    ResponseTemplate::new(200).set_body_bytes(format!("{slug}:{i}").into_bytes()),
                )
                .mount(&self.server)
                .await;
            hrefs.push(page);
        }
        self.serve_html(&format!("/albums/{slug}/"), album_page_html(name, &hrefs))
            .await;
        self.album_url(slug)
    }

    /// Serve the not-found page for `slug`
    pub async fn mount_not_found(&self, slug: &str) -> String {
        self.serve_html(&format!("/albums/{slug}/"), NOT_FOUND_HTML.to_string())
            .await;
        self.album_url(slug)
    }

    /// Serve the not-found page for `slug` with a `404` status, as the live site does
    pub async fn mount_missing(&self, slug: &str) -> String {
        self.serve_page(&format!("/albums/{slug}/"), 404, NOT_FOUND_HTML.to_string())
            .await;
        self.album_url(slug)
    }

    /// Make the album page for `slug` answer with `status` and no markup
    pub async fn fail_album_page(&self, slug: &str, status: u16) -> String {
        self.serve_page(&format!("/albums/{slug}/"), status, String::new())
            .await;
        self.album_url(slug)
    }

    /// Make one image of an album answer with `status`
    pub async fn break_image(&self, slug: &str, picture: usize, status: u16) {
        let image = format!("/images/{slug}/{picture:03}.jpg");
        Mock::given(method("GET"))
            .and(path(image.as_str()))
            .respond_with(ResponseTemplate::new(status))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Number of requests received under `prefix`
    pub async fn requests_under(&self, prefix: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().starts_with(prefix))
            .count()
    }

    async fn serve_html(&self, at: &str, html: String) {
        self.serve_page(at, 200, html).await;
    }

    async fn serve_page(&self, at: &str, status: u16, html: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(html))
            .mount(&self.server)
            .await;
    }
}

pub fn image_page_html(direct_link: &str) -> String {
    format!(
        r#"<html><body><img src="preview.jpg">
        <a class="icon-download" href="{direct_link}">Download</a></body></html>"#
    )
}

pub fn album_page_html(name: &str, image_pages: &[String]) -> String {
    let thumbs: String = image_pages
        .iter()
        .map(|href| {
            format!(r#"<div class="item thumbnail ic_container"><a href="{href}"><img src="t.jpg"></a></div>"#)
        })
        .collect();
    format!(
        r#"<html><body>
        <ul id="single_album_details">
          <li><h2>{name}</h2></li>
          <li><div><p>{} pictures</p></div></li>
        </ul>
        <a class="user_lnk" href="/users/9/">someone</a>
        {thumbs}
        </body></html>"#,
        image_pages.len()
    )
}
