//! # Scene Controller
//!
//! 场景栈与场景切换。
//!
//! ## 切换顺序
//!
//! 1. 收到请求：构造下一个场景，调用当前场景的 `stop`
//! 2. 等待当前场景不再忙（淡出、动画仍在继续更新）
//! 3. 下一个场景 `create`（或挂起的场景 `resume`）
//! 4. 当前场景 `terminate`（若已预留则挂起到栈中）
//! 5. 下一个场景就绪后 `start`，之后每帧 `update`
//!
//! 旧场景的 `terminate` 总在新场景进入 `create` 之后，
//! 因此旧场景销毁时仍可为新场景准备背景等资源。

use tracing::{debug, info};

use super::kind::SceneKind;
use super::lifecycle::{NavRequest, Navigator, Scene, SceneContext, SceneFactory, SceneState};

/// 等待接替的下一个场景
struct PendingScene<C> {
    scene: Box<dyn Scene<C>>,
    resumed: bool,
    suspend_current: bool,
}

/// 场景控制器
pub struct SceneController<C> {
    factory: Box<dyn SceneFactory<C>>,
    nav: Navigator,
    current: Option<Box<dyn Scene<C>>>,
    started: bool,
    next: Option<PendingScene<C>>,
    /// 挂起保留的场景，与导航栈中 `suspended` 的条目一一对应
    suspended: Vec<Box<dyn Scene<C>>>,
    exited: bool,
}

impl<C> std::fmt::Debug for SceneController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneController")
            .field("current", &self.current_kind())
            .field("next", &self.nav.next_scene())
            .field("stack_depth", &self.nav.stack_depth())
            .field("suspended", &self.suspended.len())
            .field("exited", &self.exited)
            .finish()
    }
}

impl<C> SceneController<C> {
    pub fn new(factory: impl SceneFactory<C> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            nav: Navigator::new(),
            current: None,
            started: false,
            next: None,
            suspended: Vec::new(),
            exited: false,
        }
    }

    /// 以指定场景启动（第一次 `update` 时进入）
    pub fn run(&mut self, kind: SceneKind, services: &mut C) {
        info!(scene = %kind, "启动场景控制器");
        self.goto(kind, services);
    }

    // ---- 导航 ----

    pub fn goto(&mut self, kind: SceneKind, services: &mut C) {
        self.nav.goto(kind);
        self.process_requests(services);
    }

    pub fn push(&mut self, kind: SceneKind, services: &mut C) {
        self.nav.push(kind);
        self.process_requests(services);
    }

    pub fn pop(&mut self, services: &mut C) {
        self.nav.pop();
        self.process_requests(services);
    }

    pub fn exit(&mut self, services: &mut C) {
        self.nav.exit();
        self.process_requests(services);
    }

    pub fn clear_stack(&mut self, services: &mut C) {
        self.nav.clear_stack();
        self.process_requests(services);
    }

    // ---- 查询 ----

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn is_scene_changing(&self) -> bool {
        self.nav.is_scene_changing()
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn current_kind(&self) -> Option<SceneKind> {
        self.current.as_ref().map(|s| s.kind())
    }

    pub fn current_state(&self) -> Option<SceneState> {
        self.current.as_ref().map(|s| s.base().state())
    }

    pub fn current(&self) -> Option<&dyn Scene<C>> {
        self.current.as_deref()
    }

    pub fn is_current_started(&self) -> bool {
        self.started
    }

    pub fn suspended_count(&self) -> usize {
        self.suspended.len()
    }

    fn is_current_busy(&self) -> bool {
        self.current.as_ref().is_some_and(|s| s.is_busy())
    }

    // ---- 每帧 ----

    /// 推进一帧：先处理待定的切换，再更新当前场景
    pub fn update(&mut self, services: &mut C) {
        if self.exited {
            return;
        }
        self.change_scene(services);
        self.update_scene(services);
    }

    fn change_scene(&mut self, services: &mut C) {
        if !self.nav.is_scene_changing() || self.is_current_busy() {
            return;
        }

        if self.nav.is_exiting() {
            if let Some(mut scene) = self.current.take() {
                let mut ctx = SceneContext {
                    services: &mut *services,
                    nav: &mut self.nav,
                };
                scene.terminate(&mut ctx);
                scene.base_mut().set_state(SceneState::Terminated);
            }
            self.terminate_suspended(services);
            self.nav.finish_exit();
            self.exited = true;
            info!("场景控制器退出");
            return;
        }

        let Some(pending) = self.next.take() else {
            return;
        };
        let mut incoming = pending.scene;
        let incoming_kind = incoming.kind();
        let outgoing = self.current.take();
        let outgoing_kind = outgoing.as_ref().map(|s| s.kind());
        debug!(from = ?outgoing_kind, to = %incoming_kind, resumed = pending.resumed, "切换场景");

        self.nav.enter(incoming_kind, outgoing_kind);
        {
            let mut ctx = SceneContext {
                services: &mut *services,
                nav: &mut self.nav,
            };
            if pending.resumed {
                incoming.resume(&mut ctx);
                incoming.base_mut().set_state(SceneState::Active);
            } else {
                incoming.create(&mut ctx);
                incoming.base_mut().set_state(SceneState::Created);
            }

            if let Some(mut scene) = outgoing {
                if pending.suspend_current {
                    debug!(scene = %scene.kind(), "挂起场景");
                    scene.base_mut().set_state(SceneState::Stopped);
                    self.suspended.push(scene);
                } else {
                    scene.terminate(&mut ctx);
                    scene.base_mut().set_state(SceneState::Terminated);
                }
            }
        }
        self.nav.finish_change();
        self.current = Some(incoming);
        self.started = pending.resumed;
        self.process_requests(services);
    }

    fn update_scene(&mut self, services: &mut C) {
        let Some(scene) = self.current.as_mut() else {
            return;
        };
        let mut ctx = SceneContext {
            services: &mut *services,
            nav: &mut self.nav,
        };
        if !self.started && scene.is_ready(&mut ctx) {
            debug!(scene = %scene.kind(), "场景开始");
            scene.base_mut().set_state(SceneState::Active);
            scene.start(&mut ctx);
            self.started = true;
        }
        if self.started {
            scene.update(&mut ctx);
            let busy = scene.is_busy();
            match scene.base().state() {
                SceneState::Fading if !busy => scene.base_mut().set_state(SceneState::Stopped),
                SceneState::Stopped if busy => scene.base_mut().set_state(SceneState::Fading),
                _ => {}
            }
        }
        self.process_requests(services);
    }

    /// 处理场景或外部发出的导航请求
    fn process_requests(&mut self, services: &mut C) {
        if self.nav.take_clear_request() {
            self.terminate_suspended(services);
        }
        while let Some(request) = self.nav.take_request() {
            match request {
                NavRequest::Change {
                    kind,
                    resume,
                    suspend_current,
                } => {
                    let (scene, resumed) = match self.suspended.pop() {
                        Some(scene) if resume && scene.kind() == kind => (scene, true),
                        other => {
                            if let Some(scene) = other {
                                self.suspended.push(scene);
                            }
                            (self.factory.create(kind, services), false)
                        }
                    };
                    if let Some(dropped) = self.next.replace(PendingScene {
                        scene,
                        resumed,
                        suspend_current,
                    }) {
                        debug!(scene = %dropped.scene.kind(), "丢弃尚未进入的场景");
                    }
                }
                NavRequest::Exit => {
                    self.next = None;
                }
            }
            self.stop_current(services);
        }
    }

    fn stop_current(&mut self, services: &mut C) {
        let Some(scene) = self.current.as_mut() else {
            return;
        };
        let mut ctx = SceneContext {
            services: &mut *services,
            nav: &mut self.nav,
        };
        scene.stop(&mut ctx);
        let state = if scene.is_busy() {
            SceneState::Fading
        } else {
            SceneState::Stopped
        };
        scene.base_mut().set_state(state);
    }

    fn terminate_suspended(&mut self, services: &mut C) {
        for mut scene in self.suspended.drain(..) {
            debug!(scene = %scene.kind(), "销毁挂起的场景");
            let mut ctx = SceneContext {
                services: &mut *services,
                nav: &mut self.nav,
            };
            scene.terminate(&mut ctx);
            scene.base_mut().set_state(SceneState::Terminated);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::scene::SceneBase;

    type Log = Rc<RefCell<Vec<String>>>;

    /// 记录回调顺序的场景
    struct Probe {
        kind: SceneKind,
        base: SceneBase,
        log: Log,
        fade_on_stop: u32,
        ready_after: u32,
        checks: u32,
    }

    impl Probe {
        fn record(&self, event: &str) {
            self.log.borrow_mut().push(format!("{}.{event}", self.kind));
        }
    }

    impl Scene<()> for Probe {
        fn kind(&self) -> SceneKind {
            self.kind
        }
        fn base(&self) -> &SceneBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut SceneBase {
            &mut self.base
        }
        fn create(&mut self, _ctx: &mut SceneContext<'_, ()>) {
            self.record("create");
        }
        fn is_ready(&mut self, _ctx: &mut SceneContext<'_, ()>) -> bool {
            self.checks += 1;
            self.checks > self.ready_after
        }
        fn start(&mut self, _ctx: &mut SceneContext<'_, ()>) {
            self.record("start");
        }
        fn stop(&mut self, _ctx: &mut SceneContext<'_, ()>) {
            self.record("stop");
            if self.fade_on_stop > 0 {
                let frames = self.fade_on_stop;
                self.base.start_fade_out(frames, false);
            }
        }
        fn terminate(&mut self, _ctx: &mut SceneContext<'_, ()>) {
            self.record("terminate");
        }
        fn resume(&mut self, _ctx: &mut SceneContext<'_, ()>) {
            self.record("resume");
        }
    }

    fn controller(log: &Log, fade_on_stop: u32, ready_after: u32) -> SceneController<()> {
        let log = log.clone();
        SceneController::new(move |kind: SceneKind, _: &mut ()| -> Box<dyn Scene<()>> {
            log.borrow_mut().push(format!("{kind}.new"));
            Box::new(Probe {
                kind,
                base: SceneBase::new(),
                log: log.clone(),
                fade_on_stop,
                ready_after,
                checks: 0,
            })
        })
    }

    #[test]
    fn test_push_pop_call_order() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 0, 0);
        ctl.run(SceneKind::Map, &mut ());
        ctl.update(&mut ());
        ctl.push(SceneKind::Menu, &mut ());
        ctl.update(&mut ());
        ctl.pop(&mut ());
        ctl.update(&mut ());

        insta::assert_debug_snapshot!(log.borrow(), @r#"
        [
            "map.new",
            "map.create",
            "map.start",
            "menu.new",
            "map.stop",
            "menu.create",
            "map.terminate",
            "menu.start",
            "map.new",
            "menu.stop",
            "map.create",
            "menu.terminate",
            "map.start",
        ]
        "#);
    }

    #[test]
    fn test_stop_precedes_create_and_terminate_follows() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 0, 0);
        ctl.run(SceneKind::Title, &mut ());
        ctl.update(&mut ());
        ctl.goto(SceneKind::Map, &mut ());
        ctl.update(&mut ());

        let log = log.borrow();
        let pos = |e: &str| log.iter().position(|x| x == e).unwrap();
        assert!(pos("title.stop") < pos("map.create"));
        assert!(pos("map.new") < pos("title.terminate"));
        assert!(pos("map.create") < pos("title.terminate"));
    }

    #[test]
    fn test_busy_scene_defers_change() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 3, 0);
        ctl.run(SceneKind::Title, &mut ());
        ctl.update(&mut ());
        ctl.goto(SceneKind::Map, &mut ());
        assert!(ctl.is_scene_changing());
        assert_eq!(ctl.current_state(), Some(SceneState::Fading));

        // 淡出 3 帧期间旧场景继续更新
        for _ in 0..3 {
            ctl.update(&mut ());
            assert_eq!(ctl.current_kind(), Some(SceneKind::Title));
        }
        assert_eq!(ctl.current_state(), Some(SceneState::Stopped));
        assert!(!log.borrow().contains(&"map.create".to_string()));

        ctl.update(&mut ());
        assert_eq!(ctl.current_kind(), Some(SceneKind::Map));
        assert!(!ctl.is_scene_changing());
        assert_eq!(ctl.navigator().previous_scene(), Some(SceneKind::Title));
    }

    #[test]
    fn test_start_waits_for_ready() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 0, 2);
        ctl.run(SceneKind::Boot, &mut ());
        ctl.update(&mut ());
        ctl.update(&mut ());
        assert!(!ctl.is_current_started());
        assert_eq!(ctl.current_state(), Some(SceneState::Created));
        ctl.update(&mut ());
        assert!(ctl.is_current_started());
        assert_eq!(ctl.current_state(), Some(SceneState::Active));
    }

    #[test]
    fn test_reserved_scene_is_suspended_and_resumed() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 0, 0);
        ctl.run(SceneKind::Map, &mut ());
        ctl.update(&mut ());

        ctl.nav.reserve_current();
        ctl.push(SceneKind::Menu, &mut ());
        ctl.update(&mut ());
        assert_eq!(ctl.suspended_count(), 1);
        assert!(!log.borrow().contains(&"map.terminate".to_string()));

        ctl.pop(&mut ());
        ctl.update(&mut ());
        assert_eq!(ctl.current_kind(), Some(SceneKind::Map));
        assert_eq!(ctl.current_state(), Some(SceneState::Active));
        assert_eq!(ctl.suspended_count(), 0);

        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| *e == "map.new").count(), 1);
        assert!(log.contains(&"map.resume".to_string()));
        assert!(!log.contains(&"map.terminate".to_string()));
    }

    #[test]
    fn test_clear_stack_terminates_suspended() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 0, 0);
        ctl.run(SceneKind::Map, &mut ());
        ctl.update(&mut ());
        ctl.nav.reserve_current();
        ctl.push(SceneKind::Menu, &mut ());
        ctl.update(&mut ());

        ctl.clear_stack(&mut ());
        assert_eq!(ctl.suspended_count(), 0);
        assert_eq!(ctl.navigator().stack_depth(), 0);
        assert!(log.borrow().contains(&"map.terminate".to_string()));

        // 栈已清空，pop 变成退出
        ctl.pop(&mut ());
        ctl.update(&mut ());
        assert!(ctl.is_exited());
        assert_eq!(ctl.current_kind(), None);
    }

    #[test]
    fn test_exit_waits_for_fade() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 2, 0);
        ctl.run(SceneKind::Title, &mut ());
        ctl.update(&mut ());
        ctl.exit(&mut ());
        ctl.update(&mut ());
        ctl.update(&mut ());
        assert!(!ctl.is_exited());
        ctl.update(&mut ());
        assert!(ctl.is_exited());
        assert_eq!(log.borrow().last().map(String::as_str), Some("title.terminate"));
        // 退出后不再更新
        ctl.update(&mut ());
        assert_eq!(log.borrow().last().map(String::as_str), Some("title.terminate"));
    }

    #[test]
    fn test_goto_replaces_pending_scene() {
        let log: Log = Rc::default();
        let mut ctl = controller(&log, 5, 0);
        ctl.run(SceneKind::Title, &mut ());
        ctl.update(&mut ());
        ctl.goto(SceneKind::Map, &mut ());
        ctl.goto(SceneKind::Battle, &mut ());
        for _ in 0..8 {
            ctl.update(&mut ());
        }
        assert_eq!(ctl.current_kind(), Some(SceneKind::Battle));
        assert!(!log.borrow().contains(&"map.create".to_string()));
    }
}
