//! 基于 `web-sys` 的页面后端

use std::cell::RefCell;
use std::rc::Rc;

use pagewave_runtime::{
    ClickInfo, ElementAction, ElementRef, HookDetail, LifecycleHook, NavigationKind,
    PageEnvironment, PageWaveConfig,
};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AnimationEvent, CustomEvent, CustomEventInit, Document, Element, Event, EventTarget,
    HtmlElement, HtmlLinkElement, MutationObserver, MutationObserverInit, Window,
};

use crate::backend::{
    KEYFRAME_META_KEYS, LiveField, PageBackend, css_property_name, ends_own_animation, live_fields,
};
use crate::cache::is_controlled_by;
use crate::error::{HostError, HostResult};

/// JS 异常转为宿主错误
pub(crate) fn js_error(operation: &str, value: JsValue) -> HostError {
    let message = value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"));
    HostError::dom(operation, message)
}

/// 监听事件直到 `handler` 返回 true，然后移除监听
pub(crate) fn listen_until(
    target: &EventTarget,
    event: &str,
    mut handler: impl FnMut(&Event) -> bool + 'static,
) -> HostResult<()> {
    type Slot = Rc<RefCell<Option<Closure<dyn FnMut(Event)>>>>;
    let slot: Slot = Rc::default();
    let inner = Rc::clone(&slot);
    let owner = target.clone();
    let event_name = event.to_string();

    let closure = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        if !handler(&ev) {
            return;
        }
        if let Some(callback) = inner.borrow_mut().take() {
            let _ = owner
                .remove_event_listener_with_callback(&event_name, callback.as_ref().unchecked_ref());
            // 正在执行中的闭包不能释放
            callback.forget();
        }
    });
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|e| js_error("addEventListener", e))?;
    *slot.borrow_mut() = Some(closure);
    Ok(())
}

/// 浏览器页面
pub struct WebPage {
    window: Window,
    document: Document,
    navigator: Option<js_sys::Function>,
    current_event: Option<Event>,
    /// 最近一次点击；离场结束的钩子在计时器中派发，此时点击已处理完
    last_click: Option<Event>,
}

impl WebPage {
    /// 绑定当前窗口
    ///
    /// `navigator` 为调用方提供的离开页面函数，缺省时直接设置 `location.href`。
    pub fn new(navigator: Option<js_sys::Function>) -> HostResult<Self> {
        let window = web_sys::window().ok_or_else(|| HostError::EnvironmentUnavailable {
            what: "window".to_string(),
        })?;
        let document = window
            .document()
            .ok_or_else(|| HostError::EnvironmentUnavailable {
                what: "document".to_string(),
            })?;
        Ok(Self {
            window,
            document,
            navigator,
            current_event: None,
            last_click: None,
        })
    }

    /// 窗口
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// 设置正在处理的点击事件（供 `prevent_default` 使用）
    pub fn set_current_event(&mut self, event: Option<Event>) {
        if let Some(event) = &event {
            self.last_click = Some(event.clone());
        }
        self.current_event = event;
    }

    /// 采集页面环境
    pub fn environment(&self, config: &PageWaveConfig) -> PageEnvironment {
        let location_href = self.window.location().href().unwrap_or_default();
        let navigation = self.navigation_kind();
        let controller_url = self.controller_script_url();
        let cache_controlled =
            is_controlled_by(controller_url.as_deref(), &config.cache_worker_script);

        PageEnvironment::new(location_href)
            .with_referrer(self.document.referrer())
            .with_navigation(navigation)
            .with_cache_controlled(cache_controlled)
    }

    fn navigation_kind(&self) -> NavigationKind {
        let Some(performance) = self.window.performance() else {
            return NavigationKind::Navigate;
        };
        let entry = performance.get_entries_by_type("navigation").get(0);
        js_sys::Reflect::get(&entry, &"type".into())
            .ok()
            .and_then(|t| t.as_string())
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }

    fn controller_script_url(&self) -> Option<String> {
        let navigator = self.window.navigator();
        if !js_sys::Reflect::has(&navigator, &"serviceWorker".into()).unwrap_or(false) {
            return None;
        }
        navigator
            .service_worker()
            .controller()
            .map(|worker| worker.script_url())
    }

    fn element(&self, id: &str) -> HostResult<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| HostError::ElementNotFound { id: id.to_string() })
    }

    fn targets(&self, target: &ElementRef) -> HostResult<Vec<HtmlElement>> {
        match target {
            ElementRef::Id(id) => Ok(vec![self.element(id)?]),
            ElementRef::Selector(selector) => {
                let nodes = self
                    .document
                    .query_selector_all(selector)
                    .map_err(|e| js_error("querySelectorAll", e))?;
                Ok((0..nodes.length())
                    .filter_map(|i| nodes.item(i))
                    .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
                    .collect())
            }
        }
    }

    /// 钩子详情中 `ele` 的活对象：id 为元素，选择器为元素数组
    fn live_element(&self, target: &ElementRef) -> HostResult<JsValue> {
        Ok(match target {
            ElementRef::Id(id) => self
                .document
                .get_element_by_id(id)
                .map(JsValue::from)
                .unwrap_or(JsValue::NULL),
            ElementRef::Selector(_) => self
                .targets(target)?
                .into_iter()
                .map(JsValue::from)
                .collect::<js_sys::Array>()
                .into(),
        })
    }

    fn create_div(&self) -> HostResult<HtmlElement> {
        self.document
            .create_element("div")
            .map_err(|e| js_error("createElement", e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| HostError::dom("createElement", "div 不是 HtmlElement"))
    }
}

/// 执行元素出现后的动作
fn run_action(element: &Element, action: ElementAction) {
    match action {
        ElementAction::Remove => element.remove(),
        ElementAction::SetHidden(hidden) => {
            if let Some(html) = element.dyn_ref::<HtmlElement>() {
                html.set_hidden(hidden);
            }
        }
    }
}

/// 把动画首帧写成内联样式并清除 `animation`
fn freeze_first_keyframe(element: &HtmlElement, animation_name: &str) {
    let style = element.style();
    if let Some(frame) = first_keyframe(element, animation_name) {
        for entry in js_sys::Object::entries(&frame).iter() {
            let pair = js_sys::Array::from(&entry);
            let Some(key) = pair.get(0).as_string() else {
                continue;
            };
            if KEYFRAME_META_KEYS.contains(&key.as_str()) {
                continue;
            }
            let value = pair.get(1).as_string().unwrap_or_default();
            let _ = style.set_property(&css_property_name(&key), &value);
        }
    }
    let _ = style.set_property("animation", "");
}

/// 元素上指定名称动画的第一个 keyframe
fn first_keyframe(element: &HtmlElement, animation_name: &str) -> Option<js_sys::Object> {
    let get_animations = js_sys::Reflect::get(element, &"getAnimations".into())
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()?;
    let animations = js_sys::Array::from(&get_animations.call0(element).ok()?);
    let animation = animations.iter().find(|a| {
        js_sys::Reflect::get(a, &"animationName".into())
            .ok()
            .and_then(|n| n.as_string())
            .is_some_and(|n| n == animation_name)
    })?;
    let effect = js_sys::Reflect::get(&animation, &"effect".into()).ok()?;
    let get_keyframes = js_sys::Reflect::get(&effect, &"getKeyframes".into())
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()?;
    let frames = js_sys::Array::from(&get_keyframes.call0(&effect).ok()?);
    frames.get(0).dyn_into::<js_sys::Object>().ok()
}

/// 事件目标是否为 `owner` 本身
fn targets_owner(event: &Event, owner: &HtmlElement) -> bool {
    event
        .target()
        .is_some_and(|target| AsRef::<JsValue>::as_ref(&target) == AsRef::<JsValue>::as_ref(owner))
}

/// 从点击事件提炼 [`ClickInfo`]
pub fn click_info(event: &Event) -> Option<ClickInfo> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let href = js_sys::Reflect::get(&element, &"href".into())
        .ok()
        .and_then(|h| h.as_string());
    let list = element.class_list();
    let classes = (0..list.length()).filter_map(|i| list.item(i)).collect();
    Some(ClickInfo {
        tag_name: element.tag_name(),
        href,
        classes,
    })
}

impl PageBackend for WebPage {
    fn inject_stylesheet(&mut self, href: &str) -> HostResult<()> {
        let selector = format!("link[rel=\"stylesheet\"][href=\"{href}\"]");
        if let Ok(Some(_)) = self.document.query_selector(&selector) {
            debug!(href, "样式表已存在");
            return Ok(());
        }

        let link = self
            .document
            .create_element("link")
            .map_err(|e| js_error("createElement", e))?
            .dyn_into::<HtmlLinkElement>()
            .map_err(|_| HostError::dom("createElement", "link 不是 HtmlLinkElement"))?;
        link.set_rel("stylesheet");
        link.set_type("text/css");
        link.set_href(href);

        let head = self
            .document
            .head()
            .ok_or_else(|| HostError::EnvironmentUnavailable {
                what: "document.head".to_string(),
            })?;
        head.append_child(&link)
            .map_err(|e| js_error("appendChild", e))?;
        Ok(())
    }

    fn register_cache_worker(&mut self, script: &str) -> HostResult<()> {
        let navigator = self.window.navigator();
        if !js_sys::Reflect::has(&navigator, &"serviceWorker".into()).unwrap_or(false) {
            warn!("浏览器不支持 service worker");
            return Ok(());
        }
        let promise = navigator.service_worker().register(script);
        let script = script.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                warn!(script, error = %js_error("register", e), "缓存 worker 注册失败");
            }
        });
        Ok(())
    }

    fn set_style(&mut self, target: &ElementRef, property: &str, value: &str) -> HostResult<()> {
        let property = css_property_name(property);
        for element in self.targets(target)? {
            element
                .style()
                .set_property(&property, value)
                .map_err(|e| js_error("setProperty", e))?;
        }
        Ok(())
    }

    fn set_hidden(&mut self, target: &ElementRef, hidden: bool) -> HostResult<()> {
        for element in self.targets(target)? {
            element.set_hidden(hidden);
        }
        Ok(())
    }

    fn set_root_property(&mut self, name: &str, value: &str) -> HostResult<()> {
        let root = self
            .document
            .document_element()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| HostError::EnvironmentUnavailable {
                what: ":root".to_string(),
            })?;
        root.style()
            .set_property(name, value)
            .map_err(|e| js_error("setProperty", e))
    }

    fn append_panel(
        &mut self,
        parent: &ElementRef,
        class_name: &str,
        animation: &str,
        remove_on_end: Option<&str>,
    ) -> HostResult<()> {
        let div = self.create_div()?;
        div.set_class_name(class_name);
        div.style()
            .set_property("animation", animation)
            .map_err(|e| js_error("setProperty", e))?;

        for parent in self.targets(parent)? {
            let panel = div
                .clone_node()
                .map_err(|e| js_error("cloneNode", e))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| HostError::dom("cloneNode", "面板不是 HtmlElement"))?;
            parent
                .append_child(&panel)
                .map_err(|e| js_error("appendChild", e))?;

            if let Some(name) = remove_on_end {
                let name = name.to_string();
                let owner = panel.clone();
                listen_until(&panel, "animationend", move |ev| {
                    let done = ev.dyn_ref::<AnimationEvent>().is_some_and(|a| {
                        ends_own_animation(&a.animation_name(), &name, targets_owner(ev, &owner))
                    });
                    if done {
                        owner.remove();
                    }
                    done
                })?;
            }
        }
        Ok(())
    }

    fn freeze_on_animation_end(
        &mut self,
        target: &ElementRef,
        animation_name: &str,
    ) -> HostResult<()> {
        for element in self.targets(target)? {
            let name = animation_name.to_string();
            let owner = element.clone();
            listen_until(&element, "animationend", move |ev| {
                let done = ev.dyn_ref::<AnimationEvent>().is_some_and(|a| {
                    ends_own_animation(&a.animation_name(), &name, targets_owner(ev, &owner))
                });
                if done {
                    freeze_first_keyframe(&owner, &name);
                }
                done
            })?;
        }
        Ok(())
    }

    fn insert_blocker(&mut self, id: &str, css_text: &str) -> HostResult<()> {
        let blocker = self.create_div()?;
        blocker.set_id(id);
        blocker.style().set_css_text(css_text);

        // 在 <head> 中执行时 body 可能还不存在
        let parent: Element = match self.document.body() {
            Some(body) => body.into(),
            None => self
                .document
                .document_element()
                .ok_or_else(|| HostError::EnvironmentUnavailable {
                    what: "document.documentElement".to_string(),
                })?,
        };
        parent
            .append_child(&blocker)
            .map_err(|e| js_error("appendChild", e))?;
        Ok(())
    }

    fn when_present(&mut self, id: &str, action: ElementAction) -> HostResult<()> {
        if let Some(element) = self.document.get_element_by_id(id) {
            run_action(&element, action);
            return Ok(());
        }

        let document = self.document.clone();
        let watched = id.to_string();
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_records: js_sys::Array, observer: MutationObserver| {
                if let Some(element) = document.get_element_by_id(&watched) {
                    observer.disconnect();
                    run_action(&element, action);
                }
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| js_error("MutationObserver", e))?;
        callback.forget();

        let root = self
            .document
            .document_element()
            .ok_or_else(|| HostError::EnvironmentUnavailable {
                what: "document.documentElement".to_string(),
            })?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(&root, &init)
            .map_err(|e| js_error("observe", e))?;
        debug!(id, "等待元素出现");
        Ok(())
    }

    fn dispatch_hook(&mut self, hook: LifecycleHook, detail: &HookDetail) -> HostResult<()> {
        let init = CustomEventInit::new();
        let value = js_sys::JSON::parse(&detail.to_json()).unwrap_or(JsValue::NULL);
        if value.is_object() {
            for field in live_fields(detail) {
                let live = match &field {
                    LiveField::Element(target) => self.live_element(target)?,
                    LiveField::ClickEvent => match &self.last_click {
                        Some(event) => event.clone().into(),
                        // 没有活事件时保留提炼出的 ClickInfo
                        None => continue,
                    },
                };
                js_sys::Reflect::set(&value, &field.key().into(), &live)
                    .map_err(|e| js_error("Reflect.set", e))?;
            }
        }
        init.set_detail(&value);
        let event = CustomEvent::new_with_event_init_dict(hook.event_name(), &init)
            .map_err(|e| js_error("CustomEvent", e))?;
        self.window
            .dispatch_event(&event)
            .map_err(|e| js_error("dispatchEvent", e))?;
        Ok(())
    }

    fn prevent_default(&mut self) -> HostResult<()> {
        if let Some(event) = &self.current_event {
            event.prevent_default();
        }
        Ok(())
    }

    fn navigate(&mut self, href: &str) -> HostResult<()> {
        match &self.navigator {
            Some(navigator) => {
                navigator
                    .call1(&JsValue::NULL, &JsValue::from_str(href))
                    .map_err(|e| js_error("navigate", e))?;
            }
            None => {
                self.window
                    .location()
                    .set_href(href)
                    .map_err(|e| js_error("location.href", e))?;
            }
        }
        Ok(())
    }
}
