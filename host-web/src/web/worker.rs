//! 缓存 worker
//!
//! 在 service worker 脚本中调用 `installAssetCache()` 安装三个监听：
//! install 预取、fetch 缓存优先、message 按需缓存。

use js_sys::Promise;
use pagewave_runtime::PageWaveConfig;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{
    Cache, ExtendableEvent, ExtendableMessageEvent, FetchEvent, Request, Response,
    ServiceWorkerGlobalScope,
};

use crate::cache::{AssetCachePlan, CacheError, FetchSource};

fn cache_error(value: JsValue) -> CacheError {
    CacheError::Js {
        message: value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}

fn scope() -> Result<ServiceWorkerGlobalScope, CacheError> {
    js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(|_| CacheError::Js {
            message: "当前不在 service worker 中".to_string(),
        })
}

async fn open_cache(scope: &ServiceWorkerGlobalScope, name: &str) -> Result<Cache, JsValue> {
    let caches = scope.caches()?;
    let cache = JsFuture::from(caches.open(name)).await?;
    cache.dyn_into::<Cache>()
}

async fn precache(scope: ServiceWorkerGlobalScope, plan: AssetCachePlan) -> Result<JsValue, JsValue> {
    let cache = open_cache(&scope, &plan.cache_name).await?;
    let urls: js_sys::Array = plan.precache.iter().map(|u| JsValue::from_str(u)).collect();
    JsFuture::from(cache.add_all_with_str_sequence(&urls)).await?;
    debug!(count = plan.precache.len(), "预取完成");
    Ok(JsValue::UNDEFINED)
}

async fn cache_first(
    scope: ServiceWorkerGlobalScope,
    request: Request,
) -> Result<JsValue, JsValue> {
    let cached = JsFuture::from(scope.caches()?.match_with_request(&request)).await?;
    match FetchSource::route(!cached.is_undefined()) {
        FetchSource::Cache => Ok(cached),
        FetchSource::Network => JsFuture::from(scope.fetch_with_request(&request)).await,
    }
}

async fn cache_on_demand(
    scope: ServiceWorkerGlobalScope,
    cache_name: String,
    data: Option<String>,
) -> Result<JsValue, JsValue> {
    let url = AssetCachePlan::parse_message(data)
        .map_err(|e| JsValue::from(js_sys::TypeError::new(&e.to_string())))?;

    let response: Response = JsFuture::from(scope.fetch_with_str(&url))
        .await?
        .dyn_into()?;
    AssetCachePlan::check_response(&url, response.status())
        .map_err(|e| JsValue::from(js_sys::TypeError::new(&e.to_string())))?;

    let cache = open_cache(&scope, &cache_name).await?;
    JsFuture::from(cache.put_with_str(&url, &response)).await?;
    debug!(url, "已缓存");
    Ok(JsValue::UNDEFINED)
}

/// 在 service worker 中安装资源缓存
///
/// `options` 为与页面 `setup` 相同的配置 JSON，用于确定预取的样式表。
#[wasm_bindgen(js_name = installAssetCache)]
pub fn install_asset_cache(options: Option<String>) -> Result<(), JsValue> {
    let config = match options.as_deref() {
        Some(json) => PageWaveConfig::from_json(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => PageWaveConfig::default(),
    };
    let plan = AssetCachePlan::for_config(&config);
    let scope = scope().map_err(|e| JsValue::from_str(&e.to_string()))?;

    let install = {
        let scope = scope.clone();
        let plan = plan.clone();
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let promise = future_to_promise(precache(scope.clone(), plan.clone()));
            if let Err(e) = event.wait_until(&promise) {
                warn!(error = %cache_error(e), "install 等待失败");
            }
        })
    };

    let fetch = {
        let scope = scope.clone();
        Closure::<dyn FnMut(FetchEvent)>::new(move |event: FetchEvent| {
            let promise: Promise = future_to_promise(cache_first(scope.clone(), event.request()));
            if let Err(e) = event.respond_with(&promise) {
                warn!(error = %cache_error(e), "fetch 响应失败");
            }
        })
    };

    let message = {
        let scope = scope.clone();
        let cache_name = plan.cache_name.clone();
        Closure::<dyn FnMut(ExtendableMessageEvent)>::new(move |event: ExtendableMessageEvent| {
            let promise = future_to_promise(cache_on_demand(
                scope.clone(),
                cache_name.clone(),
                event.data().as_string(),
            ));
            if let Err(e) = event.wait_until(&promise) {
                warn!(error = %cache_error(e), "message 等待失败");
            }
        })
    };

    for (name, callback) in [
        ("install", install.as_ref()),
        ("fetch", fetch.as_ref()),
        ("message", message.as_ref()),
    ] {
        scope.add_event_listener_with_callback(name, callback.unchecked_ref())?;
    }

    // 监听在 worker 整个生命周期内有效
    install.forget();
    fetch.forget();
    message.forget();
    Ok(())
}
