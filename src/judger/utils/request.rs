use reqwest::{header, Client};
use serde::Serialize;

fn default_header() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    [
        ("Accept", header::HeaderValue::from_static("*/*")),
        ("Connection", header::HeaderValue::from_static("keep-alive")),
    ]
    .into_iter()
    .for_each(|(x, y)| {
        headers.insert(x, y);
    });
    headers
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct RemoteJudgeRequest {
    pub client: Client,
    pub base_url: String,
    credentials: Option<Credentials>,
}

impl RemoteJudgeRequest {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: std::time::Duration,
        credentials: Option<Credentials>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .cookie_store(true)
                .default_headers(default_header())
                .build()?,
            base_url: base_url.into(),
            credentials,
        })
    }

    pub fn get_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            return url.into();
        }

        let mut res = self.base_url.to_string();

        if !res.ends_with('/') {
            res.push('/')
        }

        res.push_str(url.strip_prefix('/').unwrap_or(url));
        res
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(c) => req.basic_auth(&c.username, Some(&c.password)),
            None => req,
        }
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.auth(self.client.get(self.get_url(url))).send().await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        data: &T,
    ) -> reqwest::Result<reqwest::Response> {
        self.auth(self.client.post(self.get_url(url)))
            .form(data)
            .send()
            .await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        data: &T,
    ) -> reqwest::Result<reqwest::Response> {
        self.auth(self.client.post(self.get_url(url)))
            .json(data)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_url() {
        let req = RemoteJudgeRequest::new(
            "https://open-v1.lgapi.cn",
            "test",
            std::time::Duration::from_secs(1),
            None,
        )
        .unwrap();
        assert_eq!(
            req.get_url("/judge/result?id=1"),
            "https://open-v1.lgapi.cn/judge/result?id=1"
        );
        assert_eq!(
            req.get_url("judge/problem"),
            "https://open-v1.lgapi.cn/judge/problem"
        );
        assert_eq!(req.get_url("http://other/x"), "http://other/x");
    }
}
