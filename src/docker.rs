use hyper::{Body, Request, Response, Uri};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::convert::TryFrom;

use crate::config::EngineConfig;
use crate::connector::Transport;
use crate::errors::*;
use crate::image::Image;
use crate::version::{ApiVersion, Version};

/// Something that can produce the list of local images.
///
/// [`Docker`] is the real implementation; tests substitute a fixed list.
#[allow(async_fn_in_trait)]
pub trait ImageLister {
    /// Fetch every image, including untagged intermediate layers.
    async fn list_images(&self) -> Result<Vec<Image>>;
}

/// Used to build URLs.
enum UrlBuilder {
    Https(String),
    #[cfg(unix)]
    Local(String),
}

impl UrlBuilder {
    fn build_url(&self, path: &str) -> Result<Uri> {
        match self {
            Self::Https(base) => Ok(Uri::try_from(format!("{}{}", base, path))
                .map_err(|err| format!("cannot parse URL {}{}: {}", base, path, err))?),
            #[cfg(unix)]
            Self::Local(socket) => Ok(Uri::from(hyperlocal::Uri::new(socket, path))),
        }
    }
}

/// Our Docker client.
pub struct Docker {
    transport: Transport,
    url_builder: UrlBuilder,
    api_version: Option<ApiVersion>,
}

impl Docker {
    /// Connect to the Docker daemon described by `config`, negotiating an
    /// API version unless `config` pins one.
    pub async fn connect(config: &EngineConfig) -> Result<Docker> {
        let mut docker = Docker::new(config)?;
        if docker.api_version.is_none() {
            docker
                .negotiate_api_version()
                .await
                .chain_err(|| ErrorKind::CouldNotConnect(config.host.clone()))?;
        }
        info!(
            "connected to Docker at {} (API {})",
            config.host,
            docker
                .api_version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unversioned".to_owned())
        );
        Ok(docker)
    }

    /// Set up a client for `config` without talking to the daemon yet.
    pub fn new(config: &EngineConfig) -> Result<Docker> {
        let host = &config.host;
        let mkerr = || ErrorKind::CouldNotConnect(host.clone());
        let api_version = match config.api_version {
            Some(ref v) => Some(v.parse::<ApiVersion>()?),
            None => None,
        };

        let (transport, url_builder) = if host.starts_with("unix://") {
            Docker::unix_parts(host).chain_err(&mkerr)?
        } else if host.starts_with("tcp://") {
            // Treat docker-machine style addresses as HTTP(S) URLs.
            let (scheme, tls_dir) = if config.tls_verify {
                ("https://", Some(config.cert_dir()?))
            } else {
                ("http://", None)
            };
            let base = host.replacen("tcp://", scheme, 1);
            let transport = Transport::https(tls_dir.as_deref()).chain_err(&mkerr)?;
            (transport, UrlBuilder::Https(base))
        } else {
            return Err(ErrorKind::UnsupportedScheme(host.clone()).into());
        };

        Ok(Docker {
            transport,
            url_builder,
            api_version,
        })
    }

    #[cfg(unix)]
    fn unix_parts(addr: &str) -> Result<(Transport, UrlBuilder)> {
        let socket = addr.replacen("unix://", "", 1);
        Ok((Transport::unix(), UrlBuilder::Local(socket)))
    }

    #[cfg(not(unix))]
    fn unix_parts(addr: &str) -> Result<(Transport, UrlBuilder)> {
        Err(ErrorKind::UnsupportedScheme(addr.to_owned()).into())
    }

    /// The API version requests are made with, if one has been chosen.
    pub fn api_version(&self) -> Option<ApiVersion> {
        self.api_version
    }

    /// Ask the daemon which API version it speaks and settle on the newest
    /// one we both understand.
    pub async fn negotiate_api_version(&mut self) -> Result<ApiVersion> {
        let server = self.version().await?;
        let server_version = server.ApiVersion.parse::<ApiVersion>()?;
        let chosen = ApiVersion::negotiate(server_version);
        debug!(
            "Docker {} supports API {}, using {}",
            server.Version, server_version, chosen
        );
        self.api_version = Some(chosen);
        Ok(chosen)
    }

    fn get_url(&self, path: &str) -> Result<Uri> {
        match self.api_version {
            Some(v) => self.url_builder.build_url(&format!("/v{}{}", v, path)),
            None => self.url_builder.build_url(path),
        }
    }

    fn build_empty_get_request(&self, request_url: &Uri) -> Result<Request<Body>> {
        Ok(Request::get(request_url)
            .body(Body::empty())
            .chain_err(|| "error building request")?)
    }

    async fn start_request(&self, request: Request<Body>) -> Result<Response<Body>> {
        let response = self.transport.request(request).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(format!("HTTP request failed: {}", response.status()).into())
        }
    }

    async fn execute_request(&self, request: Request<Body>) -> Result<Vec<u8>> {
        let response = self.start_request(request).await?;
        let body = hyper::body::to_bytes(response.into_body()).await?;
        Ok(body.to_vec())
    }

    /// `GET` a path under the negotiated API version and decode it.
    async fn decode_url<T>(&self, type_name: &'static str, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request_url = self.get_url(url)?;
        self.decode(type_name, &request_url).await
    }

    async fn decode<T>(&self, type_name: &'static str, request_url: &Uri) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", request_url);
        let request = self.build_empty_get_request(request_url)?;
        let body = self.execute_request(request).await?;
        let info = serde_json::from_slice::<T>(&body).chain_err(|| {
            ErrorKind::ParseError(type_name, String::from_utf8_lossy(&body[..]).into_owned())
        })?;
        Ok(info)
    }

    /// Engine version information. Always uses the unversioned endpoint, so
    /// it works before negotiation.
    pub async fn version(&self) -> Result<Version> {
        let request_url = self.url_builder.build_url("/version")?;
        self.decode("Version", &request_url).await
    }

    /// List images. With `all`, include intermediate layers that no tag
    /// refers to.
    pub async fn images(&self, all: bool) -> Result<Vec<Image>> {
        let a = if all { "1" } else { "0" };
        let url = format!("/images/json?all={}", a);
        self.decode_url("Image", &url).await
    }
}

impl ImageLister for Docker {
    async fn list_images(&self) -> Result<Vec<Image>> {
        self.images(true).await.chain_err(|| "Failed to list images")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::MAX_API_VERSION;
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Server, StatusCode};
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    const VERSION_BODY: &str = r#"{"Version":"26.1.0","ApiVersion":"1.45","MinAPIVersion":"1.24"}"#;

    const IMAGES_BODY: &str = r#"[{"Id":"sha256:a6bd71f48f6839d9faae1f29d3babef8","RepoTags":["nginx:latest"],"RepoDigests":[],"Created":1702468300,"Size":187694648,"SharedSize":-1,"Labels":null,"Containers":1}]"#;

    /// Serve canned `/version` and image list responses on a local port,
    /// recording the path and query of every request.
    fn fake_daemon(images_status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(vec![]));
        let recorder = seen.clone();
        let make_svc = make_service_fn(move |_conn| {
            let recorder = recorder.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let recorder = recorder.clone();
                    async move {
                        recorder.lock().unwrap().push(req.uri().to_string());
                        let (status, body) = if req.uri().path() == "/version" {
                            (StatusCode::OK, VERSION_BODY)
                        } else {
                            (images_status, IMAGES_BODY)
                        };
                        let response = Response::builder()
                            .status(status)
                            .body(Body::from(body))
                            .unwrap();
                        Ok::<_, Infallible>(response)
                    }
                }))
            }
        });
        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
        let addr = server.local_addr();
        tokio::spawn(async move {
            let _ = server.await;
        });
        (addr, seen)
    }

    fn config(host: &str) -> EngineConfig {
        EngineConfig::default().with_host(host)
    }

    #[test]
    fn rejects_unknown_schemes() {
        let err = Docker::new(&config("ssh://me@box")).err().unwrap();
        match err.kind() {
            ErrorKind::UnsupportedScheme(host) => assert_eq!(host, "ssh://me@box"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pinned_versions_prefix_paths() {
        let mut cfg = config("tcp://127.0.0.1:2375");
        cfg.api_version = Some("1.41".to_owned());
        let docker = Docker::new(&cfg).unwrap();
        assert_eq!(
            docker.get_url("/images/json?all=1").unwrap().to_string(),
            "http://127.0.0.1:2375/v1.41/images/json?all=1"
        );
    }

    #[test]
    fn unpinned_clients_use_bare_paths() {
        let docker = Docker::new(&config("tcp://127.0.0.1:2375")).unwrap();
        assert_eq!(docker.api_version(), None);
        assert_eq!(
            docker.get_url("/version").unwrap().to_string(),
            "http://127.0.0.1:2375/version"
        );
    }

    #[test]
    fn bad_pinned_versions_are_errors() {
        let mut cfg = config("tcp://127.0.0.1:2375");
        cfg.api_version = Some("latest".to_owned());
        assert!(Docker::new(&cfg).is_err());
    }

    #[tokio::test]
    async fn negotiates_then_lists_all_images() {
        let (addr, seen) = fake_daemon(StatusCode::OK);
        let docker = Docker::connect(&config(&format!("tcp://{}", addr)))
            .await
            .unwrap();
        assert_eq!(docker.api_version(), Some(MAX_API_VERSION));

        let images = docker.list_images().await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].short_id().unwrap(), "a6bd71f48f68");
        assert_eq!(images[0].repo_tag_pairs(), vec![("nginx", "latest")]);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["/version", "/v1.43/images/json?all=1"]
        );
    }

    #[tokio::test]
    async fn failed_listings_are_errors() {
        let (addr, seen) = fake_daemon(StatusCode::INTERNAL_SERVER_ERROR);
        let docker = Docker::connect(&config(&format!("tcp://{}", addr)))
            .await
            .unwrap();
        let err = docker.list_images().await.unwrap_err();
        assert!(err.iter().any(|e| e.to_string().contains("500")));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
