//! # 页面过渡集成测试
//!
//! 用 MemoryPage 驱动完整的离场 → 导航 → 入场流程。
//! 这些测试不依赖浏览器。

use host_web::{EntryPoint, MemoryPage, PageDriver};
use pagewave_runtime::variant::OverlayPanel;
use pagewave_runtime::{
    ClickInfo, MemoryNavigationStore, NavigationKind, NavigationStore, PageEnvironment,
    PageWaveConfig, TransitionSet, Variant,
};

type Driver = PageDriver<MemoryPage, MemoryNavigationStore>;

/// 关闭缓存 worker 的配置
fn no_cache() -> PageWaveConfig {
    PageWaveConfig {
        use_persistent_cache: false,
        ..PageWaveConfig::default()
    }
}

fn first_page() -> PageEnvironment {
    PageEnvironment::new("https://example.com/a")
}

fn second_page() -> PageEnvironment {
    PageEnvironment::new("https://example.com/b").with_referrer("https://example.com/a")
}

fn depart(config: PageWaveConfig, transitions: TransitionSet, click: ClickInfo) -> Driver {
    let mut driver = PageDriver::open(
        EntryPoint::SendPoint,
        config,
        first_page(),
        transitions,
        MemoryPage::new().with_element("main-content"),
        MemoryNavigationStore::new(),
    );
    driver.start();
    assert!(driver.click_attached());
    driver.click(click);
    driver
}

fn arrive(
    config: PageWaveConfig,
    env: PageEnvironment,
    transitions: TransitionSet,
    page: MemoryPage,
    store: MemoryNavigationStore,
) -> Driver {
    let mut driver = PageDriver::open(EntryPoint::EndPoint, config, env, transitions, page, store);
    driver.start();
    driver
}

/// 场景 A：style 过渡，离场正向播放，入场反向播放并写回起始值
#[test]
fn test_style_transition_round_trip() {
    let transitions = TransitionSet::single(Variant::style("opacity", 300, "0", "1"));

    let mut driver = depart(
        no_cache(),
        transitions.clone(),
        ClickInfo::link("https://example.com/b"),
    );
    assert_eq!(driver.backend().prevented_count(), 1);
    assert_eq!(driver.backend().style("main-content", "opacity"), Some("1"));
    assert_eq!(
        driver.backend().style("main-content", "transition"),
        Some("opacity 300ms linear")
    );
    assert!(driver.backend().navigations().is_empty());

    driver.advance(300);
    assert_eq!(driver.backend().navigations(), ["https://example.com/b"]);
    assert_eq!(
        driver.backend().hook_names(),
        vec!["animateSSP", "animateSF", "animateEF", "animateESP"]
    );
    assert!(!driver.click_attached());

    let (_, store) = driver.into_parts();
    assert_eq!(store.read().as_deref(), Some("false"));

    // 新页面：主内容在脚本执行后才加入文档
    let config = PageWaveConfig {
        reveal_delay_ms: 300,
        ..no_cache()
    };
    let mut driver = arrive(config, second_page(), transitions, MemoryPage::new(), store);
    assert!(driver.store().read().is_none());
    assert!(driver.awaiting_ready());

    driver.backend_mut().attach_element("main-content");
    assert_eq!(driver.backend().is_hidden("main-content"), Some(true));

    driver.document_ready();
    driver.advance(200);
    assert_eq!(driver.backend().style("main-content", "opacity"), Some("1"));

    driver.advance(40);
    assert_eq!(driver.backend().style("main-content", "opacity"), Some("0"));
    assert_eq!(driver.backend().is_hidden("main-content"), Some(true));

    driver.run_until_idle();
    assert_eq!(driver.now_ms(), 500);
    assert_eq!(driver.backend().is_hidden("main-content"), Some(false));
    assert_eq!(
        driver.backend().hook_names(),
        vec!["animateSEP", "animateSR", "animateER", "animateEEP"]
    );
    assert_eq!(
        driver.backend().journal(),
        ["attach #main-content", "hide #main-content", "show #main-content"]
    );
}

/// 场景 B：overlay 离场不插入遮挡面板，入场插入并在显示时移除
#[test]
fn test_overlay_blocker_only_on_arrival() {
    let overlay = Variant::overlay(
        vec![OverlayPanel::new("firstOverlayElement", "slideIn")],
        500,
        "#000",
    );
    let transitions = TransitionSet::single(overlay);

    let mut driver = depart(
        no_cache(),
        transitions.clone(),
        ClickInfo::link("https://example.com/b"),
    );
    assert_eq!(driver.backend().root_property("--div-color"), Some("#000"));
    driver.advance(500);
    assert!(
        !driver
            .backend()
            .journal()
            .iter()
            .any(|entry| entry.starts_with("blocker"))
    );

    let (_, store) = driver.into_parts();
    assert_eq!(store.read().as_deref(), Some("true"));

    let page = MemoryPage::new().with_element("main-content");
    let mut driver = arrive(no_cache(), second_page(), transitions, page, store);
    assert!(driver.backend().has_element("pageBlocker"));
    assert_eq!(
        driver.backend().style("pageBlocker", "background-color"),
        Some("#000")
    );
    assert_eq!(driver.backend().style("pageBlocker", "z-index"), Some("100"));

    driver.document_ready();
    driver.run_until_idle();

    assert!(!driver.backend().has_element("pageBlocker"));
    assert!(driver.backend().has_element("main-content"));
    assert_eq!(
        driver.backend().journal(),
        ["show #main-content", "blocker #pageBlocker", "remove #pageBlocker"]
    );
    let panels = &driver.backend().element("main-content").unwrap().panels;
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0].animation, "slideIn 500ms linear both reverse");
}

/// 场景 C：刷新且不重放时立即显示
#[test]
fn test_reload_reveals_immediately() {
    let env = second_page().with_navigation(NavigationKind::Reload);
    let page = MemoryPage::new().with_element("main-content");
    let store = MemoryNavigationStore::with_value("false");

    let mut driver = arrive(
        no_cache(),
        env,
        TransitionSet::single(Variant::keyframe("fade", 300)),
        page,
        store,
    );
    driver.document_ready();

    assert_eq!(driver.pending_timers(), 0);
    assert_eq!(driver.backend().hook_names(), vec!["animateEPNA"]);
    assert_eq!(driver.backend().is_hidden("main-content"), Some(false));
    assert_eq!(driver.backend().style("main-content", "animation"), None);
}

/// 场景 D：忽略的链接且不为自链接动画时立即显示
#[test]
fn test_ignored_link_arrival_reveals_immediately() {
    let config = PageWaveConfig {
        animate_self_links: false,
        animate_ignored_links: false,
        ..no_cache()
    };
    let page = MemoryPage::new().with_element("main-content");
    let store = MemoryNavigationStore::with_value("ignore");

    let mut driver = arrive(
        config,
        second_page(),
        TransitionSet::single(Variant::keyframe("fade", 300)),
        page,
        store,
    );
    driver.document_ready();

    assert_eq!(driver.pending_timers(), 0);
    assert_eq!(driver.backend().hook_names(), vec!["animateEPNA"]);
    assert_eq!(
        driver.backend().journal(),
        ["hide #main-content", "show #main-content"]
    );
}

#[test]
fn test_ignore_class_keeps_default_navigation() {
    let driver = depart(
        no_cache(),
        TransitionSet::single(Variant::keyframe("fade", 300)),
        ClickInfo::link("https://example.com/c").with_class("ignore-click"),
    );

    assert_eq!(driver.backend().prevented_count(), 0);
    assert!(driver.backend().hooks().is_empty());
    assert_eq!(driver.pending_timers(), 0);
    assert!(driver.click_attached());
    assert_eq!(driver.store().read().as_deref(), Some("ignore"));
}

#[test]
fn test_persisted_category_follows_selected_candidate() {
    let transitions = TransitionSet::new(
        Variant::keyframe("fade", 300),
        Some(Variant::overlay(
            vec![OverlayPanel::new("firstOverlayElement", "slideIn")],
            400,
            "#123",
        )),
        None,
    );

    let driver = depart(
        no_cache(),
        transitions.clone(),
        ClickInfo::link("https://example.com/b").with_class("a-overlay"),
    );
    assert_eq!(driver.store().read().as_deref(), Some("true"));

    let driver = depart(
        no_cache(),
        transitions,
        ClickInfo::link("https://example.com/b").with_class("a-animation"),
    );
    assert_eq!(driver.store().read().as_deref(), Some("false"));
}

#[test]
fn test_keyframe_arrival_freezes_first_frame() {
    let transitions = TransitionSet::single(Variant::keyframe("fade", 300));
    let mut page = MemoryPage::new().with_element("main-content");
    page.define_keyframes("fade", &[("offset", "0"), ("opacity", "0.2")]);

    let mut driver = arrive(
        no_cache(),
        second_page(),
        transitions,
        page,
        MemoryNavigationStore::with_value("false"),
    );
    driver.document_ready();
    driver.advance(200);
    assert_eq!(
        driver.backend().style("main-content", "animation"),
        Some("fade 300ms linear both reverse")
    );

    driver.backend_mut().finish_animations();
    assert_eq!(driver.backend().style("main-content", "opacity"), Some("0.2"));
    assert_eq!(driver.backend().style("main-content", "animation"), None);
}

#[test]
fn test_cache_worker_gates_click_listener() {
    let mut driver = PageDriver::open(
        EntryPoint::ListenForChange,
        PageWaveConfig::default(),
        first_page(),
        TransitionSet::single(Variant::keyframe("fade", 300)),
        MemoryPage::new().with_element("main-content"),
        MemoryNavigationStore::new(),
    );
    driver.start();

    assert_eq!(driver.backend().workers(), ["sw.js"]);
    assert_eq!(
        driver.backend().stylesheets(),
        ["OverlayPreset.css", "KeyFramePreset.css"]
    );
    assert!(!driver.click_attached());

    driver.document_ready();
    assert!(driver.click_attached());
    // 未被 worker 控制：不播放入场动画
    assert_eq!(driver.backend().hook_names(), vec!["animateEPNSW"]);
    assert_eq!(driver.backend().is_hidden("main-content"), Some(false));
}

#[test]
fn test_ignore_click_skips_next_entry_by_default() {
    let transitions = TransitionSet::single(Variant::keyframe("fade", 300));
    let driver = depart(
        no_cache(),
        transitions.clone(),
        ClickInfo::link("https://example.com/b").with_class("ignore-click"),
    );
    let (_, store) = driver.into_parts();
    assert_eq!(store.read().as_deref(), Some("ignore"));

    let page = MemoryPage::new().with_element("main-content");
    let mut driver = arrive(no_cache(), second_page(), transitions, page, store);
    driver.document_ready();
    driver.run_until_idle();

    assert_eq!(driver.backend().hook_names(), vec!["animateEPNA"]);
    assert_eq!(driver.backend().style("main-content", "animation"), None);
    assert_eq!(driver.backend().is_hidden("main-content"), Some(false));
}

#[test]
fn test_multi_element_round_trip() {
    let transitions = TransitionSet::single(
        Variant::multi_element([(".card", "cardIn"), (".title", "titleIn")], 400)
            .with_main_animation("fadeIn"),
    );

    let mut driver = depart(
        no_cache(),
        transitions.clone(),
        ClickInfo::link("https://example.com/b"),
    );
    assert_eq!(
        driver.backend().selector_style(".card", "animation"),
        Some("cardIn 400ms linear both normal")
    );
    assert_eq!(
        driver.backend().selector_style(".title", "animation"),
        Some("titleIn 400ms linear both normal")
    );
    assert_eq!(
        driver.backend().style("main-content", "animation"),
        Some("fadeIn 400ms linear both normal")
    );
    driver.advance(400);
    assert_eq!(driver.backend().navigations(), ["https://example.com/b"]);

    let (_, store) = driver.into_parts();
    let mut page = MemoryPage::new().with_element("main-content");
    page.define_keyframes("cardIn", &[("offset", "0"), ("transform", "translateY(20px)")]);
    page.define_keyframes("titleIn", &[("offset", "0"), ("opacity", "0.5")]);
    page.define_keyframes("fadeIn", &[("offset", "0"), ("opacity", "0")]);

    let mut driver = arrive(no_cache(), second_page(), transitions, page, store);
    driver.document_ready();
    driver.advance(200);
    assert_eq!(
        driver.backend().selector_style(".card", "animation"),
        Some("cardIn 400ms linear both reverse")
    );
    assert_eq!(
        driver.backend().style("main-content", "animation"),
        Some("fadeIn 400ms linear both reverse")
    );

    driver.backend_mut().finish_animations();
    driver.run_until_idle();

    let page = driver.backend();
    assert_eq!(page.selector_style(".card", "transform"), Some("translateY(20px)"));
    assert_eq!(page.selector_style(".card", "animation"), None);
    assert_eq!(page.selector_style(".title", "opacity"), Some("0.5"));
    assert_eq!(page.style("main-content", "opacity"), Some("0"));
    assert_eq!(page.style("main-content", "animation"), None);
    assert_eq!(page.is_hidden("main-content"), Some(false));
    assert_eq!(
        page.hook_names(),
        vec!["animateSEP", "animateSR", "animateEEP", "animateER"]
    );
}
