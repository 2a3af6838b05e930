//! HTTP transports for reaching the Docker daemon.

use hyper::client::{Client, HttpConnector, ResponseFuture};
use hyper::{Body, Request};
use hyper_rustls::HttpsConnector;
#[cfg(unix)]
use hyperlocal::UnixConnector;
use log::{error, warn};
use rustls::{
    internal::pemfile,
    sign::{CertifiedKey, RSASigningKey},
    Certificate, ClientConfig, PrivateKey, ResolvesClientCert, SignatureScheme,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::errors::*;

/// A `hyper` client speaking either HTTPS/HTTP or HTTP over a Unix socket.
pub(crate) enum Transport {
    /// Connect via HTTPS (or plain HTTP).
    Https(Client<HttpsConnector<HttpConnector>, Body>),

    /// Connect via a local Unix stream.
    #[cfg(unix)]
    Local(Client<UnixConnector, Body>),
}

impl Transport {
    /// Build an HTTPS/HTTP transport. When `tls_dir` is set, trust the
    /// `ca.pem` found there and present `cert.pem`/`key.pem` on request.
    pub(crate) fn https(tls_dir: Option<&Path>) -> Result<Transport> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let config = client_config(tls_dir)?;
        let connector = HttpsConnector::from((http, config));
        Ok(Transport::Https(Client::builder().build(connector)))
    }

    /// Build a Unix socket transport.
    #[cfg(unix)]
    pub(crate) fn unix() -> Transport {
        Transport::Local(Client::builder().build(UnixConnector))
    }

    /// Send `request` over whichever connection we have.
    pub(crate) fn request(&self, request: Request<Body>) -> ResponseFuture {
        match self {
            Transport::Https(client) => client.request(request),
            #[cfg(unix)]
            Transport::Local(client) => client.request(request),
        }
    }
}

/// Set up our `rustls` parameters, starting from the operating system's
/// trust store and adding Docker's own CA if we're using TLS.
fn client_config(tls_dir: Option<&Path>) -> Result<ClientConfig> {
    let mut config = ClientConfig::new();
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    config.ct_logs = Some(&ct_logs::LOGS);

    config.root_store = match rustls_native_certs::load_native_certs() {
        Ok(store) => store,
        Err((Some(store), err)) => {
            warn!("could not load all certificates: {}", err);
            store
        }
        Err((None, err)) => {
            warn!("cannot access native certificate store: {}", err);
            config.root_store
        }
    };
    config
        .root_store
        .add_server_trust_anchors(&webpki_roots::TLS_SERVER_ROOTS);

    if let Some(dir) = tls_dir {
        let certs = CertDir(dir.to_owned());
        let ca_path = certs.ca_pem();
        let mut rdr = open_buffered(&ca_path)?;
        config
            .root_store
            .add_pem_file(&mut rdr)
            .map_err(|_| format!("error reading {}", ca_path.display()))?;
        config.client_auth_cert_resolver = Arc::new(certs);
    }

    Ok(config)
}

/// A directory laid out like `~/.docker`, holding the CA and our client
/// credentials. Also serves as our client certificate resolver.
struct CertDir(PathBuf);

impl CertDir {
    fn ca_pem(&self) -> PathBuf {
        self.0.join("ca.pem")
    }

    fn client_key(&self) -> Result<CertifiedKey> {
        let mut chain = certs(&self.0.join("cert.pem"))?;
        chain.extend(certs(&self.ca_pem())?);

        let key_path = self.0.join("key.pem");
        let mut found = keys(&key_path)?;
        if found.len() != 1 {
            return Err(format!(
                "expected 1 private key in {}, found {}",
                key_path.display(),
                found.len()
            )
            .into());
        }
        let key = found.remove(0);
        let signing_key = RSASigningKey::new(&key)
            .map_err(|_| format!("could not parse signing key from {}", key_path.display()))?;

        Ok(CertifiedKey::new(chain, Arc::new(Box::new(signing_key))))
    }
}

impl ResolvesClientCert for CertDir {
    fn resolve(
        &self,
        _acceptable_issuers: &[&[u8]],
        _sigschemes: &[SignatureScheme],
    ) -> Option<CertifiedKey> {
        match self.client_key() {
            Ok(key) => Some(key),
            Err(err) => {
                error!("error reading Docker client keys: {}", err);
                None
            }
        }
    }

    fn has_certs(&self) -> bool {
        true
    }
}

/// Fetch any certificates stored at `path`.
fn certs(path: &Path) -> Result<Vec<Certificate>> {
    let mut rdr = open_buffered(path)?;
    Ok(pemfile::certs(&mut rdr).map_err(|_| format!("cannot read {}", path.display()))?)
}

/// Fetch any PKCS#8 or RSA keys stored at `path`.
fn keys(path: &Path) -> Result<Vec<PrivateKey>> {
    let mut rdr = open_buffered(path)?;
    let mut found = pemfile::pkcs8_private_keys(&mut rdr)
        .map_err(|_| format!("cannot read {}", path.display()))?;

    rdr = open_buffered(path)?;
    found.extend(
        pemfile::rsa_private_keys(&mut rdr)
            .map_err(|_| format!("cannot read {}", path.display()))?,
    );
    Ok(found)
}

fn open_buffered(path: &Path) -> Result<io::BufReader<fs::File>> {
    let f = fs::File::open(path).chain_err(|| format!("cannot open {}", path.display()))?;
    Ok(io::BufReader::new(f))
}
