use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use hyper::ext::ReasonPhrase;
use reqwest::{Client, StatusCode, redirect::Policy};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::Config,
    failure::WeatherFailure,
    model::{WeatherQuery, WeatherResult},
};

/// Current-weather client for the OpenWeather `data/2.5/weather` endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    /// Build a client from config. Fails when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_owned();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            http,
        })
    }

    pub async fn fetch_query(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherFailure> {
        self.fetch(&query.city_name).await
    }

    /// Fetch current weather for `city_name`. One request, no retries.
    pub async fn fetch(&self, city_name: &str) -> Result<WeatherResult, WeatherFailure> {
        debug!(city = city_name, url = %self.base_url, "requesting current weather");

        let outcome = self.fetch_current(city_name).await;
        match &outcome {
            Ok(result) => debug!(
                city = city_name,
                condition_id = result.condition_id,
                "received current weather"
            ),
            Err(failure) => warn!(city = city_name, %failure, "weather request failed"),
        }
        outcome
    }

    async fn fetch_current(&self, city_name: &str) -> Result<WeatherResult, WeatherFailure> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", city_name), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherFailure::from_transport(&e))?;

        let status = res.status();
        if status != StatusCode::OK {
            // hyper only records the phrase when it differs from the canonical one.
            let reason = res
                .extensions()
                .get::<ReasonPhrase>()
                .and_then(|r| std::str::from_utf8(r.as_bytes()).ok());
            return Err(WeatherFailure::from_status_line(status, reason));
        }

        let body = res
            .text()
            .await
            .map_err(|e| WeatherFailure::from_transport(&e))?;

        parse_current(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<Value>,
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

/// Validate and parse a current-weather body received with HTTP 200.
///
/// The body's own `cod` must also be the integer 200. Error bodies may carry
/// it as a numeric string; that is read only to report the code.
pub fn parse_current(body: &str) -> Result<WeatherResult, WeatherFailure> {
    let envelope: OwEnvelope = serde_json::from_str(body).map_err(|e| {
        WeatherFailure::OtherRequestError(format!("malformed weather response: {e}"))
    })?;

    match envelope.cod.as_ref().and_then(cod_as_i64) {
        Some(200) if envelope.cod.as_ref().is_some_and(Value::is_number) => {}
        Some(cod) => {
            let message = match envelope.message {
                Some(Value::String(detail)) if !detail.is_empty() => {
                    format!("provider reported code {cod}: {detail}")
                }
                Some(Value::Null) | Some(Value::String(_)) | None => {
                    format!("provider reported code {cod}")
                }
                Some(other) => format!("provider reported code {cod}: {other}"),
            };
            return Err(WeatherFailure::OtherRequestError(message));
        }
        None => {
            return Err(WeatherFailure::OtherRequestError(
                "weather response is missing a valid `cod` field".to_string(),
            ));
        }
    }

    let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(|e| {
        WeatherFailure::OtherRequestError(format!("unexpected weather response shape: {e}"))
    })?;

    let first = parsed.weather.into_iter().next().ok_or_else(|| {
        WeatherFailure::OtherRequestError("weather response contained no conditions".to_string())
    })?;

    Ok(WeatherResult {
        temperature_kelvin: parsed.main.temp,
        condition_id: first.id,
        condition_description: first.description,
    })
}

fn cod_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::mpsc,
    };

    const CLEAR_SKY: &str =
        r#"{"cod":200,"main":{"temp":288.0},"weather":[{"id":800,"description":"clear sky"}]}"#;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Serve the same canned response to every connection and report each request head.
    async fn serve_canned(response: String) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                let response = response.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let head = read_head(&mut stream).await;
                    let _ = tx.send(head);
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (addr, rx)
    }

    /// Accept connections and never answer them.
    async fn serve_silent() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let _ = read_head(&mut stream).await;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    drop(stream);
                });
            }
        });

        addr
    }

    async fn read_head(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(base_url: String) -> OpenWeatherClient {
        let cfg = Config {
            api_key: Some("KEY".into()),
            base_url,
            timeout_secs: 1,
            max_redirects: 2,
        };
        OpenWeatherClient::from_config(&cfg).unwrap()
    }

    fn url(addr: SocketAddr) -> String {
        format!("http://{addr}/data/2.5/weather")
    }

    #[test]
    fn from_config_errors_when_missing_api_key() {
        let err = OpenWeatherClient::from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = client_for("http://localhost/".into());
        assert!(!format!("{client:?}").contains("KEY"));
    }

    #[test]
    fn parse_current_reads_documented_fields() {
        let result = parse_current(CLEAR_SKY).unwrap();
        assert_eq!(
            result,
            WeatherResult {
                temperature_kelvin: 288.0,
                condition_id: 800,
                condition_description: "clear sky".into(),
            }
        );
    }

    #[test]
    fn parse_current_rejects_string_success_cod() {
        let body = r#"{"cod":"200","main":{"temp":280.5},"weather":[{"id":500,"description":"light rain"}]}"#;
        assert_eq!(
            parse_current(body).unwrap_err(),
            WeatherFailure::OtherRequestError("provider reported code 200".into())
        );
    }

    #[test]
    fn parse_current_surfaces_non_200_cod() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        assert_eq!(
            parse_current(body).unwrap_err(),
            WeatherFailure::OtherRequestError("provider reported code 404: city not found".into())
        );
    }

    #[test]
    fn parse_current_rejects_missing_or_malformed_fields() {
        let cases = [
            "",
            "not json",
            r#"{"main":{"temp":1.0},"weather":[{"id":800,"description":"x"}]}"#,
            r#"{"cod":200}"#,
            r#"{"cod":200,"main":{"temp":"warm"},"weather":[{"id":800,"description":"x"}]}"#,
            r#"{"cod":200,"main":{"temp":290.0},"weather":[]}"#,
        ];
        for body in cases {
            assert!(
                matches!(parse_current(body), Err(WeatherFailure::OtherRequestError(_))),
                "body {body:?}"
            );
        }
    }

    #[tokio::test]
    async fn fetch_success_sends_city_and_key() {
        let (addr, mut requests) = serve_canned(http_response("200 OK", CLEAR_SKY)).await;
        let client = client_for(url(addr));

        let result = client.fetch("New York").await.unwrap();
        assert_eq!(result.condition_id, 800);
        assert_eq!(result.condition_description, "clear sky");

        let head = requests.recv().await.unwrap();
        assert!(head.starts_with("GET /data/2.5/weather?"), "{head}");
        assert!(head.contains("q=New+York"), "{head}");
        assert!(head.contains("appid=KEY"), "{head}");
    }

    #[tokio::test]
    async fn repeated_fetches_are_identical() {
        let (addr, _requests) = serve_canned(http_response("200 OK", CLEAR_SKY)).await;
        let client = client_for(url(addr));

        let first = client.fetch_query(&WeatherQuery::new("Oslo")).await.unwrap();
        let second = client.fetch_query(&WeatherQuery::new("Oslo")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fetch_maps_404_to_not_found() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        let (addr, _requests) = serve_canned(http_response("404 Not Found", body)).await;

        let err = client_for(url(addr)).fetch("Atlantis").await.unwrap_err();
        assert_eq!(err, WeatherFailure::NotFound);
    }

    #[tokio::test]
    async fn fetch_maps_unlisted_status_to_other_http_error() {
        let (addr, _requests) = serve_canned(http_response("418 I'm a teapot", "")).await;

        let err = client_for(url(addr)).fetch("Paris").await.unwrap_err();
        assert_eq!(
            err,
            WeatherFailure::OtherHttpError { code: 418, message: "418 I'm a teapot".into() }
        );
    }

    #[tokio::test]
    async fn fetch_keeps_server_reason_phrase() {
        let (addr, _requests) = serve_canned(http_response("599 Network Weirdness", "")).await;

        let err = client_for(url(addr)).fetch("Paris").await.unwrap_err();
        assert_eq!(
            err,
            WeatherFailure::OtherHttpError { code: 599, message: "599 Network Weirdness".into() }
        );
    }

    #[tokio::test]
    async fn fetch_surfaces_bad_cod_in_200_response() {
        let body = r#"{"cod":401,"message":"Invalid API key"}"#;
        let (addr, _requests) = serve_canned(http_response("200 OK", body)).await;

        let err = client_for(url(addr)).fetch("Paris").await.unwrap_err();
        assert!(matches!(err, WeatherFailure::OtherRequestError(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn fetch_detects_redirect_loop() {
        let response =
            "HTTP/1.1 302 Found\r\nLocation: /data/2.5/weather\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string();
        let (addr, _requests) = serve_canned(response).await;

        let err = client_for(url(addr)).fetch("Paris").await.unwrap_err();
        assert_eq!(err, WeatherFailure::TooManyRedirects);
    }

    #[tokio::test]
    async fn fetch_times_out_on_silent_server() {
        let addr = serve_silent().await;

        let err = client_for(url(addr)).fetch("Paris").await.unwrap_err();
        assert_eq!(err, WeatherFailure::Timeout);
    }

    #[tokio::test]
    async fn fetch_reports_refused_connection() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = client_for(url(addr)).fetch("Paris").await.unwrap_err();
        assert_eq!(err, WeatherFailure::ConnectionError);
    }

    #[tokio::test]
    async fn fetch_reports_invalid_base_url_as_request_error() {
        let err = client_for("not a url".into()).fetch("Paris").await.unwrap_err();
        assert!(matches!(err, WeatherFailure::OtherRequestError(_)));
    }
}
