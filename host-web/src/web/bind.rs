//! JS 入口
//!
//! `setup` 保存配置，之后 `listenForChange` / `sendPoint` / `endPoint`
//! 各自创建一个会话。会话状态以 `Rc<RefCell<_>>` 共享给计时器和事件回调。

use std::cell::RefCell;
use std::rc::Rc;

use pagewave_runtime::{
    PageInput, PageSession, PageWaveConfig, TransitionSet, Variant, setup_commands,
};
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event};

use super::console::init_console_logging;
use super::page::{WebPage, click_info, js_error};
use super::storage::SessionStore;
use crate::driver::{EntryPoint, build_session};
use crate::error::{HostError, HostResult};
use crate::executor::{CommandExecutor, CommandOutput};
use crate::logging::parse_level;

thread_local! {
    static ACTIVE_CONFIG: RefCell<Option<PageWaveConfig>> = const { RefCell::new(None) };
}

/// 当前生效的配置，未调用 `setup` 时为默认值
fn active_config() -> PageWaveConfig {
    ACTIVE_CONFIG.with(|slot| {
        slot.borrow().clone().unwrap_or_else(|| {
            warn!("未调用 setup，使用默认配置");
            PageWaveConfig::default()
        })
    })
}

struct Inner {
    session: PageSession,
    executor: CommandExecutor,
    page: WebPage,
    store: SessionStore,
    click_listener: Option<Closure<dyn FnMut(Event)>>,
}

/// 浏览器中的一个会话
#[derive(Clone)]
struct WebHost {
    inner: Rc<RefCell<Inner>>,
}

impl WebHost {
    fn open(
        entry: EntryPoint,
        transitions: TransitionSet,
        navigator: Option<js_sys::Function>,
    ) -> HostResult<Self> {
        let config = active_config();
        let page = WebPage::new(navigator)?;
        let mut store = SessionStore::open();
        let env = page.environment(&config);
        debug!(?env, "页面环境");

        let session = build_session(entry, config, env, transitions, &mut store);
        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                session,
                executor: CommandExecutor::new(),
                page,
                store,
                click_listener: None,
            })),
        })
    }

    fn start(&self) {
        let output = {
            let mut guard = self.inner.borrow_mut();
            let Inner {
                session,
                executor,
                page,
                store,
                ..
            } = &mut *guard;
            let commands = session.start();
            executor.execute_batch(&commands, page, store)
        };
        self.apply_output(output);
    }

    /// 把输入交给会话并执行产生的指令
    fn feed(&self, input: PageInput, event: Option<Event>) {
        let output = {
            let mut guard = self.inner.borrow_mut();
            let Inner {
                session,
                executor,
                page,
                store,
                ..
            } = &mut *guard;
            page.set_current_event(event);
            let commands = session.handle(input);
            let output = executor.execute_batch(&commands, page, store);
            page.set_current_event(None);
            output
        };
        self.apply_output(output);
    }

    /// 安装执行结果要求的计时器和监听器
    fn apply_output(&self, output: CommandOutput) {
        for (id, delay_ms) in output.timers {
            if let Err(e) = self.start_timer(id, delay_ms) {
                warn!(error = %e, "计时器启动失败");
            }
        }
        for (event, stop_propagation) in output.listen_once {
            if let Err(e) = self.listen_once(&event, stop_propagation) {
                warn!(event, error = %e, "事件监听失败");
            }
        }
        match output.click_listener {
            Some(true) => self.attach_click_listener(),
            Some(false) => self.detach_click_listener(),
            None => {}
        }
    }

    fn start_timer(&self, id: pagewave_runtime::TimerId, delay_ms: u32) -> HostResult<()> {
        let host = self.clone();
        let callback = Closure::once_into_js(move || host.feed(PageInput::TimerFired(id), None));
        let window = self.inner.borrow().page.window().clone();
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )
            .map_err(|e| js_error("setTimeout", e))?;
        Ok(())
    }

    fn listen_once(&self, event: &str, stop_propagation: bool) -> HostResult<()> {
        let host = self.clone();
        let callback = Closure::once_into_js(move |ev: Event| {
            if stop_propagation {
                ev.stop_propagation();
            }
            host.feed(PageInput::DocumentReady, None);
        });
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        let window = self.inner.borrow().page.window().clone();
        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.unchecked_ref(),
                &options,
            )
            .map_err(|e| js_error("addEventListener", e))
    }

    fn attach_click_listener(&self) {
        if self.inner.borrow().click_listener.is_some() {
            return;
        }
        let host = self.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            if let Some(info) = click_info(&ev) {
                host.feed(PageInput::Click(info), Some(ev));
            }
        });
        let mut inner = self.inner.borrow_mut();
        if let Err(e) = inner
            .page
            .window()
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        {
            warn!(error = %js_error("addEventListener", e), "点击监听失败");
            return;
        }
        inner.click_listener = Some(closure);
    }

    fn detach_click_listener(&self) {
        let mut inner = self.inner.borrow_mut();
        let Some(closure) = inner.click_listener.take() else {
            return;
        };
        let _ = inner
            .page
            .window()
            .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        // 移除可能发生在点击回调执行期间
        closure.forget();
    }
}

fn to_js(error: HostError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_variant(json: &str) -> HostResult<Variant> {
    Variant::from_json(json).map_err(|e| HostError::InvalidArgument {
        message: e.to_string(),
    })
}

/// 由 JS 传入的 JSON 组装过渡集合，缺省的候选回落到基础变体
fn parse_transitions(
    style: &str,
    overlay: Option<String>,
    animation: Option<String>,
) -> HostResult<TransitionSet> {
    let base = parse_variant(style)?;
    let overlay = overlay.as_deref().map(parse_variant).transpose()?;
    let animation = animation.as_deref().map(parse_variant).transpose()?;
    Ok(TransitionSet::new(base, overlay, animation))
}

fn open_session(
    entry: EntryPoint,
    style: &str,
    overlay: Option<String>,
    animation: Option<String>,
    navigator: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    let transitions = parse_transitions(style, overlay, animation).map_err(to_js)?;
    let host = WebHost::open(entry, transitions, navigator).map_err(to_js)?;
    host.start();
    Ok(())
}

/// 合并配置并注入预设样式表
#[wasm_bindgen]
pub fn setup(options: &str, log_level: Option<String>) -> Result<(), JsValue> {
    init_console_logging(parse_level(log_level.as_deref()));

    let options = if options.trim().is_empty() { "{}" } else { options };
    let config = PageWaveConfig::from_json(options)
        .map_err(|e| to_js(HostError::from(pagewave_runtime::PageWaveError::from(e))))?;
    info!(main = %config.main_content_id, "配置已加载");

    let mut page = WebPage::new(None).map_err(to_js)?;
    let mut store = SessionStore::open();
    let commands = setup_commands(&config);
    CommandExecutor::new().execute_batch(&commands, &mut page, &mut store);

    ACTIVE_CONFIG.with(|slot| *slot.borrow_mut() = Some(config));
    Ok(())
}

/// 同时监听入场与离场
#[wasm_bindgen(js_name = listenForChange)]
pub fn listen_for_change(
    style: &str,
    overlay: Option<String>,
    animation: Option<String>,
    navigator: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    open_session(EntryPoint::ListenForChange, style, overlay, animation, navigator)
}

/// 只处理离场
#[wasm_bindgen(js_name = sendPoint)]
pub fn send_point(
    style: &str,
    overlay: Option<String>,
    animation: Option<String>,
    navigator: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    open_session(EntryPoint::SendPoint, style, overlay, animation, navigator)
}

/// 只处理入场
#[wasm_bindgen(js_name = endPoint)]
pub fn end_point(
    style: &str,
    overlay: Option<String>,
    animation: Option<String>,
) -> Result<(), JsValue> {
    open_session(EntryPoint::EndPoint, style, overlay, animation, None)
}

/// 变体是否属于 overlay 类别
#[wasm_bindgen(js_name = isOverlay)]
pub fn is_overlay(style: &str) -> Result<bool, JsValue> {
    let variant = parse_variant(style).map_err(to_js)?;
    Ok(variant.category().is_overlay())
}

/// 请求缓存 worker 缓存一个资源
///
/// 页面未被 worker 控制时什么都不做。
#[wasm_bindgen(js_name = cacheAsset)]
pub fn cache_asset(url: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| {
        to_js(HostError::EnvironmentUnavailable {
            what: "window".to_string(),
        })
    })?;
    let navigator = window.navigator();
    if !js_sys::Reflect::has(&navigator, &"serviceWorker".into()).unwrap_or(false) {
        return Ok(());
    }
    match navigator.service_worker().controller() {
        Some(worker) => worker.post_message(&JsValue::from_str(url)),
        None => {
            debug!(url, "页面未被缓存 worker 控制");
            Ok(())
        }
    }
}
