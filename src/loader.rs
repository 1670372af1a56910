use exhibit_core::model::{parse_gltf, progress_percent, ModelMesh};
use gloo_net::http::Request;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

/// Download `url`, reporting whole-percent progress when the size is known.
pub async fn fetch_bytes(url: &str, mut on_progress: impl FnMut(u32)) -> anyhow::Result<Vec<u8>> {
    let resp = Request::get(url).send().await?;
    if !resp.ok() {
        anyhow::bail!("HTTP {} for {}", resp.status(), url);
    }
    let total = resp
        .headers()
        .get("content-length")
        .and_then(|v| v.trim().parse::<u64>().ok());
    let Some(body) = resp.body() else {
        return Ok(Vec::new());
    };
    let reader: web::ReadableStreamDefaultReader = body.get_reader().dyn_into().map_err(js_err)?;

    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut last_reported = None;
    loop {
        let chunk = JsFuture::from(reader.read()).await.map_err(js_err)?;
        let done = Reflect::get(&chunk, &JsValue::from_str("done"))
            .map(|v| v.is_truthy())
            .unwrap_or(true);
        if done {
            break;
        }
        let value = Reflect::get(&chunk, &JsValue::from_str("value")).map_err(js_err)?;
        let array = Uint8Array::new(&value);
        let start = bytes.len();
        bytes.resize(start + array.length() as usize, 0);
        array.copy_to(&mut bytes[start..]);

        let pct = progress_percent(bytes.len() as u64, total);
        if pct.is_some() && pct != last_reported {
            last_reported = pct;
            if let Some(p) = pct {
                on_progress(p);
            }
        }
    }
    Ok(bytes)
}

pub async fn load_model(url: &str, on_progress: impl FnMut(u32)) -> anyhow::Result<ModelMesh> {
    let bytes = fetch_bytes(url, on_progress).await?;
    log::debug!("[loader] {} bytes from {}", bytes.len(), url);
    Ok(parse_gltf(&bytes)?)
}
