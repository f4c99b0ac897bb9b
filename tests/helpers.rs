// Shared test fixtures: a local TLS server with rcgen certificates, a fake
// HTTP CONNECT proxy and a fake SOCKS5 relay.

#![allow(dead_code)] // Each test file uses a different subset

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

/// A certificate and its key.
pub struct Issued {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl Issued {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }
}

fn name(common_name: &str, organization: Option<&str>) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    if let Some(org) = organization {
        dn.push(DnType::OrganizationName, org);
    }
    dn
}

/// Self-signed root CA.
pub fn root_ca(common_name: &str) -> Issued {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = name(common_name, Some("Certinfo Test"));
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    Issued { cert, key }
}

/// Intermediate CA signed by `issuer`.
pub fn intermediate_ca(common_name: &str, issuer: &Issued) -> Issued {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = name(common_name, Some("Certinfo Test"));
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    Issued { cert, key }
}

/// Leaf certificate for `dns_names`, signed by `issuer`, valid until the end of `not_after_year`.
pub fn leaf(common_name: &str, dns_names: &[&str], issuer: &Issued, not_after_year: i32) -> Issued {
    let mut params =
        CertificateParams::new(dns_names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .unwrap();
    params.distinguished_name = name(common_name, None);
    params.not_before = rcgen::date_time_ymd(2019, 1, 1);
    params.not_after = rcgen::date_time_ymd(not_after_year, 12, 31);
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    Issued { cert, key }
}

/// TLS server on 127.0.0.1 presenting `chain`, keyed by `key`.
pub struct TlsServer {
    pub addr: SocketAddr,
    /// Accepted TCP connections
    pub connections: Arc<AtomicUsize>,
}

impl TlsServer {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

pub async fn spawn_tls_server(chain: Vec<CertificateDer<'static>>, key: &KeyPair) -> TlsServer {
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(chain, key)
    .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let mut buf = [0u8; 256];
                    // Wait for the client's close_notify or EOF.
                    while let Ok(n) = tls.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                    }
                    let _ = tls.shutdown().await;
                }
            });
        }
    });

    TlsServer { addr, connections }
}

/// Leaf for `cert.test` signed by a root CA, served as `[leaf, root]`.
pub async fn spawn_default_server() -> TlsServer {
    let root = root_ca("Certinfo Root CA");
    let leaf = leaf("cert.test", &["cert.test", "www.cert.test"], &root, 2099);
    spawn_tls_server(vec![leaf.der(), root.der()], &leaf.key).await
}

/// Fake HTTP proxy. Answers each CONNECT with the next status in `statuses`
/// (the last one repeats) and relays `200` tunnels to `upstream`.
pub struct ConnectProxy {
    pub addr: SocketAddr,
    pub connections: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

pub async fn spawn_connect_proxy(statuses: Vec<u16>, upstream: SocketAddr) -> ConnectProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let (conn_counter, seen) = (Arc::clone(&connections), Arc::clone(&requests));

    tokio::spawn(async move {
        while let Ok((mut client, _)) = listener.accept().await {
            let index = conn_counter.fetch_add(1, Ordering::SeqCst);
            let status = statuses
                .get(index)
                .or_else(|| statuses.last())
                .copied()
                .unwrap_or(200);
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let Some(head) = read_head(&mut client).await else {
                    return;
                };
                seen.lock().unwrap().push(head);
                if status != 200 {
                    let _ = client
                        .write_all(
                            format!("HTTP/1.1 {status} Denied\r\nContent-Length: 0\r\n\r\n")
                                .as_bytes(),
                        )
                        .await;
                    return;
                }
                let Ok(mut server) = TcpStream::connect(upstream).await else {
                    return;
                };
                let _ = client
                    .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
                    .await;
                let _ = tokio::io::copy_bidirectional(&mut client, &mut server).await;
            });
        }
    });

    ConnectProxy {
        addr,
        connections,
        requests,
    }
}

async fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if stream.read(&mut byte).await.ok()? == 0 {
            return None;
        }
        head.push(byte[0]);
    }
    String::from_utf8(head).ok()
}

/// Fake SOCKS5 relay. Records each requested destination and relays every
/// request to `upstream`. Requires username/password auth when `credentials` is set.
pub struct Socks5Proxy {
    pub addr: SocketAddr,
    pub destinations: Arc<Mutex<Vec<String>>>,
    pub logins: Arc<Mutex<Vec<(String, String)>>>,
}

pub async fn spawn_socks5_proxy(
    upstream: SocketAddr,
    credentials: Option<(&str, &str)>,
) -> Socks5Proxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let destinations = Arc::new(Mutex::new(Vec::new()));
    let logins = Arc::new(Mutex::new(Vec::new()));
    let (seen_dest, seen_login) = (Arc::clone(&destinations), Arc::clone(&logins));
    let require_auth = credentials.is_some();

    tokio::spawn(async move {
        while let Ok((mut client, _)) = listener.accept().await {
            let seen_dest = Arc::clone(&seen_dest);
            let seen_login = Arc::clone(&seen_login);
            tokio::spawn(async move {
                let _ = socks5_session(&mut client, upstream, require_auth, seen_dest, seen_login)
                    .await;
            });
        }
    });

    Socks5Proxy {
        addr,
        destinations,
        logins,
    }
}

async fn socks5_session(
    client: &mut TcpStream,
    upstream: SocketAddr,
    require_auth: bool,
    destinations: Arc<Mutex<Vec<String>>>,
    logins: Arc<Mutex<Vec<(String, String)>>>,
) -> std::io::Result<()> {
    // Greeting: VER NMETHODS METHODS...
    let mut header = [0u8; 2];
    client.read_exact(&mut header).await?;
    let mut methods = vec![0u8; header[1] as usize];
    client.read_exact(&mut methods).await?;

    if require_auth {
        client.write_all(&[5, 2]).await?;
        // RFC 1929: VER ULEN UNAME PLEN PASSWD
        let mut ver_len = [0u8; 2];
        client.read_exact(&mut ver_len).await?;
        let mut user = vec![0u8; ver_len[1] as usize];
        client.read_exact(&mut user).await?;
        let mut plen = [0u8; 1];
        client.read_exact(&mut plen).await?;
        let mut pass = vec![0u8; plen[0] as usize];
        client.read_exact(&mut pass).await?;
        logins.lock().unwrap().push((
            String::from_utf8_lossy(&user).into_owned(),
            String::from_utf8_lossy(&pass).into_owned(),
        ));
        client.write_all(&[1, 0]).await?;
    } else {
        client.write_all(&[5, 0]).await?;
    }

    // Request: VER CMD RSV ATYP DST.ADDR DST.PORT
    let mut request = [0u8; 4];
    client.read_exact(&mut request).await?;
    let host = match request[3] {
        1 => {
            let mut ip = [0u8; 4];
            client.read_exact(&mut ip).await?;
            std::net::Ipv4Addr::from(ip).to_string()
        }
        3 => {
            let mut len = [0u8; 1];
            client.read_exact(&mut len).await?;
            let mut name = vec![0u8; len[0] as usize];
            client.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).into_owned()
        }
        4 => {
            let mut ip = [0u8; 16];
            client.read_exact(&mut ip).await?;
            std::net::Ipv6Addr::from(ip).to_string()
        }
        _ => return Ok(()),
    };
    let mut port = [0u8; 2];
    client.read_exact(&mut port).await?;
    destinations
        .lock()
        .unwrap()
        .push(format!("{host}:{}", u16::from_be_bytes(port)));

    let mut server = TcpStream::connect(upstream).await?;
    client.write_all(&[5, 0, 0, 1, 0, 0, 0, 0, 0, 0]).await?;
    tokio::io::copy_bidirectional(client, &mut server).await?;
    Ok(())
}

/// A port on 127.0.0.1 with nothing listening.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
