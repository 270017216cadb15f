//! # Memory Page 模块
//!
//! 内存中的页面后端：记录可观察的页面状态，
//! 供无界面宿主和集成测试使用。
//!
//! 只模拟过渡关心的部分：按 id 的元素、内联样式、`hidden`、
//! overlay 面板、根元素自定义属性、通知和导航。

use std::collections::BTreeMap;

use pagewave_runtime::{ElementAction, ElementRef, HookDetail, LifecycleHook};

use crate::backend::{KEYFRAME_META_KEYS, PageBackend};
use crate::error::{HostError, HostResult};

/// overlay 面板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPanel {
    /// 面板 class
    pub class_name: String,
    /// `animation` 简写值
    pub animation: String,
    /// 结束时移除所依据的动画名
    pub remove_on_end: Option<String>,
}

/// 按 id 定位的元素
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    /// 内联样式
    pub style: BTreeMap<String, String>,
    /// `hidden`
    pub hidden: bool,
    /// 追加的 overlay 面板
    pub panels: Vec<MemoryPanel>,
}

/// 内存页面
#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: BTreeMap<String, MemoryElement>,
    selector_styles: BTreeMap<String, BTreeMap<String, String>>,
    root_properties: BTreeMap<String, String>,
    stylesheets: Vec<String>,
    workers: Vec<String>,
    watchers: Vec<(String, ElementAction)>,
    freezes: Vec<(ElementRef, String)>,
    keyframes: BTreeMap<String, Vec<(String, String)>>,
    hooks: Vec<(LifecycleHook, HookDetail)>,
    navigations: Vec<String>,
    prevented: usize,
    journal: Vec<String>,
}

impl MemoryPage {
    /// 创建空页面
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先放入一个元素
    pub fn with_element(mut self, id: &str) -> Self {
        self.elements.insert(id.to_string(), MemoryElement::default());
        self
    }

    /// 登记 keyframe 的首帧（含 `offset` 等元数据键）
    pub fn define_keyframes(&mut self, name: &str, first_frame: &[(&str, &str)]) {
        let frame = first_frame
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.keyframes.insert(name.to_string(), frame);
    }

    /// 元素加入文档，触发等待它的一次性动作
    pub fn attach_element(&mut self, id: &str) {
        self.elements.entry(id.to_string()).or_default();
        self.journal.push(format!("attach #{id}"));

        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.watchers)
            .into_iter()
            .partition(|(watched, _)| watched == id);
        self.watchers = waiting;
        for (watched, action) in ready {
            self.run_action(&watched, action);
        }
    }

    /// 模拟所有进行中的动画结束（animationend）
    ///
    /// 冻结首帧样式并移除设置了自清理的面板。
    pub fn finish_animations(&mut self) {
        for (target, name) in std::mem::take(&mut self.freezes) {
            let frame: Vec<(String, String)> = self
                .keyframes
                .get(&name)
                .map(|frame| {
                    frame
                        .iter()
                        .filter(|(k, _)| !KEYFRAME_META_KEYS.contains(&k.as_str()))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            let style = match &target {
                ElementRef::Id(id) => self.elements.get_mut(id).map(|e| &mut e.style),
                ElementRef::Selector(selector) => self.selector_styles.get_mut(selector),
            };
            if let Some(style) = style {
                style.extend(frame);
                style.remove("animation");
            }
        }

        for element in self.elements.values_mut() {
            element.panels.retain(|panel| panel.remove_on_end.is_none());
        }
    }

    /// 元素是否存在
    pub fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// 元素状态
    pub fn element(&self, id: &str) -> Option<&MemoryElement> {
        self.elements.get(id)
    }

    /// 元素的内联样式值
    pub fn style(&self, id: &str, property: &str) -> Option<&str> {
        self.elements
            .get(id)
            .and_then(|e| e.style.get(property))
            .map(String::as_str)
    }

    /// 选择器目标的内联样式值
    pub fn selector_style(&self, selector: &str, property: &str) -> Option<&str> {
        self.selector_styles
            .get(selector)
            .and_then(|s| s.get(property))
            .map(String::as_str)
    }

    /// 元素是否隐藏；不存在返回 `None`
    pub fn is_hidden(&self, id: &str) -> Option<bool> {
        self.elements.get(id).map(|e| e.hidden)
    }

    /// 根元素自定义属性
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties.get(name).map(String::as_str)
    }

    /// 已注入的样式表
    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    /// 已注册的缓存 worker 脚本
    pub fn workers(&self) -> &[String] {
        &self.workers
    }

    /// 已派发的通知
    pub fn hooks(&self) -> &[(LifecycleHook, HookDetail)] {
        &self.hooks
    }

    /// 已派发通知的事件名
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|(hook, _)| hook.event_name()).collect()
    }

    /// 导航记录
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// 被阻止默认行为的点击数
    pub fn prevented_count(&self) -> usize {
        self.prevented
    }

    /// 尚在等待元素出现的动作数
    pub fn pending_watchers(&self) -> usize {
        self.watchers.len()
    }

    /// 可见性相关操作的顺序记录
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    fn element_mut(&mut self, id: &str) -> HostResult<&mut MemoryElement> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| HostError::ElementNotFound { id: id.to_string() })
    }

    fn run_action(&mut self, id: &str, action: ElementAction) {
        match action {
            ElementAction::Remove => {
                self.elements.remove(id);
                self.journal.push(format!("remove #{id}"));
            }
            ElementAction::SetHidden(hidden) => {
                if let Some(element) = self.elements.get_mut(id) {
                    element.hidden = hidden;
                }
                let verb = if hidden { "hide" } else { "show" };
                self.journal.push(format!("{verb} #{id}"));
            }
        }
    }
}

impl PageBackend for MemoryPage {
    fn inject_stylesheet(&mut self, href: &str) -> HostResult<()> {
        self.stylesheets.push(href.to_string());
        Ok(())
    }

    fn register_cache_worker(&mut self, script: &str) -> HostResult<()> {
        self.workers.push(script.to_string());
        Ok(())
    }

    fn set_style(&mut self, target: &ElementRef, property: &str, value: &str) -> HostResult<()> {
        match target {
            ElementRef::Id(id) => {
                self.element_mut(id)?
                    .style
                    .insert(property.to_string(), value.to_string());
            }
            ElementRef::Selector(selector) => {
                self.selector_styles
                    .entry(selector.clone())
                    .or_default()
                    .insert(property.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn set_hidden(&mut self, target: &ElementRef, hidden: bool) -> HostResult<()> {
        if let ElementRef::Id(id) = target {
            self.element_mut(id)?.hidden = hidden;
        }
        Ok(())
    }

    fn set_root_property(&mut self, name: &str, value: &str) -> HostResult<()> {
        self.root_properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn append_panel(
        &mut self,
        parent: &ElementRef,
        class_name: &str,
        animation: &str,
        remove_on_end: Option<&str>,
    ) -> HostResult<()> {
        let ElementRef::Id(id) = parent else {
            return Err(HostError::dom("append_panel", "父元素必须按 id 引用"));
        };
        self.element_mut(id)?.panels.push(MemoryPanel {
            class_name: class_name.to_string(),
            animation: animation.to_string(),
            remove_on_end: remove_on_end.map(str::to_string),
        });
        Ok(())
    }

    fn freeze_on_animation_end(
        &mut self,
        target: &ElementRef,
        animation_name: &str,
    ) -> HostResult<()> {
        self.freezes
            .push((target.clone(), animation_name.to_string()));
        Ok(())
    }

    fn insert_blocker(&mut self, id: &str, css_text: &str) -> HostResult<()> {
        let style = css_text
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        self.elements.insert(
            id.to_string(),
            MemoryElement {
                style,
                ..MemoryElement::default()
            },
        );
        self.journal.push(format!("blocker #{id}"));
        Ok(())
    }

    fn when_present(&mut self, id: &str, action: ElementAction) -> HostResult<()> {
        if self.elements.contains_key(id) {
            self.run_action(id, action);
        } else {
            self.watchers.push((id.to_string(), action));
        }
        Ok(())
    }

    fn dispatch_hook(&mut self, hook: LifecycleHook, detail: &HookDetail) -> HostResult<()> {
        self.hooks.push((hook, detail.clone()));
        Ok(())
    }

    fn prevent_default(&mut self) -> HostResult<()> {
        self.prevented += 1;
        Ok(())
    }

    fn navigate(&mut self, href: &str) -> HostResult<()> {
        self.navigations.push(href.to_string());
        self.journal.push(format!("navigate {href}"));
        Ok(())
    }
}
