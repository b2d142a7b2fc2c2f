use std::fmt::Write;

/// An HTTP-only Nginx server block forwarding a domain to a local
/// port. Certbot later rewrites it to add TLS.
///
/// # Example
///
/// ```
/// use n8n_provision::nginx::{self, NginxSite};
///
/// let site = NginxSite::new("n8n.example.com", 5678)
///     .websockets()
///     .client_max_body_size("16M");
///
/// let conf = nginx::render(&site);
/// assert!(conf.contains("server_name n8n.example.com;"));
/// assert!(conf.contains("proxy_pass http://127.0.0.1:5678;"));
/// ```
#[derive(Debug, Clone)]
pub struct NginxSite {
    pub domain: String,
    pub upstream_port: u16,
    pub websockets: bool,
    pub client_max_body_size: Option<String>,
}

impl NginxSite {
    #[must_use]
    pub fn new(domain: &str, upstream_port: u16) -> Self {
        Self {
            domain: domain.to_string(),
            upstream_port,
            websockets: false,
            client_max_body_size: None,
        }
    }

    #[must_use]
    pub const fn websockets(mut self) -> Self {
        self.websockets = true;
        self
    }

    #[must_use]
    pub fn client_max_body_size(mut self, size: &str) -> Self {
        self.client_max_body_size = Some(size.to_string());
        self
    }

    /// File name used under `sites-available` and `sites-enabled`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.domain
    }
}

/// Render the server block.
#[must_use]
pub fn render(site: &NginxSite) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "server {{");
    let _ = writeln!(out, "    listen 80;");
    let _ = writeln!(out, "    listen [::]:80;");
    let _ = writeln!(out, "    server_name {};", site.domain);
    if let Some(size) = &site.client_max_body_size {
        let _ = writeln!(out, "    client_max_body_size {size};");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "    location / {{");
    let _ = writeln!(
        out,
        "        proxy_pass http://127.0.0.1:{};",
        site.upstream_port
    );
    let _ = writeln!(out, "        proxy_http_version 1.1;");
    if site.websockets {
        let _ = writeln!(out, "        proxy_set_header Upgrade $http_upgrade;");
        let _ = writeln!(out, "        proxy_set_header Connection \"upgrade\";");
        let _ = writeln!(out, "        proxy_buffering off;");
        let _ = writeln!(out, "        proxy_read_timeout 3600s;");
    }
    let _ = writeln!(out, "        proxy_set_header Host $host;");
    let _ = writeln!(out, "        proxy_set_header X-Real-IP $remote_addr;");
    let _ = writeln!(
        out,
        "        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;"
    );
    let _ = writeln!(out, "        proxy_set_header X-Forwarded-Proto $scheme;");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");

    out
}
