//! # Engine 模块
//!
//! 过渡引擎：把"变体 + 方向"翻译为 DOM 指令。
//!
//! ## 执行模型
//!
//! ```text
//! apply(variant, direction) -> Vec<Command>
//! ```
//!
//! 1. 预设展开为自定义变体后递归执行，预设本身不发通知
//! 2. 自定义变体先发 start 通知，再发出 DOM 指令
//! 3. 登记一个 `duration_ms` 的计时器，到期发 end 通知
//!
//! 引擎不等待动画完成；end 通知只由计时器驱动，
//! 与 CSS 动画是否真正播完无关。

use tracing::{debug, warn};

use crate::command::{ElementRef, PageCommand};
use crate::config::PageWaveConfig;
use crate::hook::{HookDetail, LifecycleHook};
use crate::timer::{Task, Timers};
use crate::variant::{
    Direction, KeyframeAnimation, MultiElementAnimation, OverlayAnimation, StyleTransition,
    Variant,
};

/// CSS 根元素上承载 overlay 颜色的自定义属性
pub const OVERLAY_COLOR_PROPERTY: &str = "--div-color";

/// 过渡引擎
///
/// 只借用配置，不持有状态；计时器表由调用方传入。
pub struct TransitionEngine<'a> {
    config: &'a PageWaveConfig,
}

impl<'a> TransitionEngine<'a> {
    /// 创建引擎
    pub fn new(config: &'a PageWaveConfig) -> Self {
        Self { config }
    }

    /// 主内容元素引用
    pub fn main_element(&self) -> ElementRef {
        ElementRef::id(&self.config.main_content_id)
    }

    /// 播放变体
    ///
    /// # 参数
    ///
    /// - `variant`: 要播放的变体
    /// - `direction`: 方向
    /// - `timers`: 计时器表（登记 end 通知和 style 重置）
    pub fn apply(
        &self,
        variant: &Variant,
        direction: Direction,
        timers: &mut Timers,
    ) -> Vec<PageCommand> {
        if variant.is_preset() {
            return match variant.expand_preset() {
                Some(custom) => self.apply(&custom, direction, timers),
                None => {
                    warn!(variant = ?variant, "未知预设，跳过过渡");
                    Vec::new()
                }
            };
        }

        let main = self.main_element();
        let detail = HookDetail::with_element(variant.clone(), main.clone());
        debug!(
            category = ?variant.category(),
            direction = direction.css_keyword(),
            duration_ms = variant.duration_ms(),
            "播放过渡"
        );

        let mut commands = vec![PageCommand::hook(
            LifecycleHook::start_of(direction),
            detail.clone(),
        )];

        match variant {
            Variant::Style(style) => self.play_style(style, direction, &main, timers, &mut commands),
            Variant::Keyframe(keyframe) => self.play_keyframe(keyframe, direction, &main, &mut commands),
            Variant::MultiElement(multi) => self.play_multi(multi, direction, &main, &mut commands),
            Variant::Overlay(overlay) => self.play_overlay(overlay, direction, &main, &mut commands),
            // 预设已在上面展开
            Variant::KeyframePreset(_) | Variant::OverlayPreset(_) => {}
        }

        commands.push(timers.schedule(
            Task::DispatchHook {
                hook: LifecycleHook::end_of(direction),
                detail: Box::new(detail),
            },
            variant.duration_ms(),
        ));
        commands
    }

    fn play_style(
        &self,
        style: &StyleTransition,
        direction: Direction,
        main: &ElementRef,
        timers: &mut Timers,
        commands: &mut Vec<PageCommand>,
    ) {
        let transition = format!("{} {}ms {}", style.property, style.duration_ms, style.timing);

        match direction {
            Direction::Forward => {
                commands.push(PageCommand::set_style(main.clone(), &style.property, &style.start));
                commands.push(PageCommand::set_style(main.clone(), "transition", transition));
                commands.push(PageCommand::set_style(main.clone(), &style.property, &style.end));
            }
            Direction::Reverse => {
                commands.push(PageCommand::set_style(main.clone(), &style.property, &style.end));
                commands.push(PageCommand::set_style(main.clone(), "transition", transition));
                // 立即写回会与样式重算竞争，过渡不会触发
                commands.push(timers.schedule(
                    Task::RestoreStyle {
                        target: main.clone(),
                        property: style.property.clone(),
                        value: style.start.clone(),
                    },
                    self.config.style_reset_grace_ms,
                ));
            }
        }
    }

    fn play_keyframe(
        &self,
        keyframe: &KeyframeAnimation,
        direction: Direction,
        main: &ElementRef,
        commands: &mut Vec<PageCommand>,
    ) {
        commands.push(PageCommand::SetHidden {
            target: main.clone(),
            hidden: false,
        });
        animate(
            main.clone(),
            &keyframe.name,
            keyframe.duration_ms,
            &keyframe.timing,
            direction,
            commands,
        );
    }

    fn play_multi(
        &self,
        multi: &MultiElementAnimation,
        direction: Direction,
        main: &ElementRef,
        commands: &mut Vec<PageCommand>,
    ) {
        commands.push(PageCommand::SetHidden {
            target: main.clone(),
            hidden: false,
        });
        for target in &multi.targets {
            animate(
                ElementRef::selector(&target.selector),
                &target.animation,
                multi.duration_ms,
                &multi.timing,
                direction,
                commands,
            );
        }
        if let Some(name) = &multi.main_animation {
            animate(
                main.clone(),
                name,
                multi.duration_ms,
                &multi.timing,
                direction,
                commands,
            );
        }
    }

    fn play_overlay(
        &self,
        overlay: &OverlayAnimation,
        direction: Direction,
        main: &ElementRef,
        commands: &mut Vec<PageCommand>,
    ) {
        commands.push(PageCommand::SetRootProperty {
            name: OVERLAY_COLOR_PROPERTY.to_string(),
            value: overlay.color.clone(),
        });
        for panel in &overlay.panels {
            commands.push(PageCommand::AppendPanel {
                parent: main.clone(),
                class_name: panel.class_name.clone(),
                animation: animation_shorthand(
                    &panel.animation,
                    overlay.duration_ms,
                    &overlay.timing,
                    direction,
                ),
                remove_on_end: self
                    .config
                    .clean_up_panels
                    .then(|| panel.animation.clone()),
            });
        }
        if let Some(name) = &overlay.main_animation {
            commands.push(PageCommand::set_style(
                main.clone(),
                "animation",
                animation_shorthand(name, overlay.duration_ms, &overlay.timing, direction),
            ));
        }
    }
}

/// `animation` 简写：`name duration timing both direction`
pub fn animation_shorthand(
    name: &str,
    duration_ms: u32,
    timing: &str,
    direction: Direction,
) -> String {
    format!(
        "{name} {duration_ms}ms {timing} both {}",
        direction.css_keyword()
    )
}

/// 设置 keyframe 动画；反向时在结束后冻结终点样式
fn animate(
    target: ElementRef,
    name: &str,
    duration_ms: u32,
    timing: &str,
    direction: Direction,
    commands: &mut Vec<PageCommand>,
) {
    commands.push(PageCommand::set_style(
        target.clone(),
        "animation",
        animation_shorthand(name, duration_ms, timing, direction),
    ));
    if direction == Direction::Reverse {
        commands.push(PageCommand::FreezeOnAnimationEnd {
            target,
            animation_name: name.to_string(),
        });
    }
}
