//! # Lifecycle 模块
//!
//! 场景生命周期：[`Scene`] trait、场景公共状态 [`SceneBase`]、
//! 以及场景在回调中发出导航请求用的 [`Navigator`]。
//!
//! ## 生命周期
//!
//! ```text
//! Created --(就绪)--> Active --(stop)--> Fading --(不再忙)--> Stopped --> Terminated
//!                        ^                                       |
//!                        +-------------(resume，出栈)-------------+
//! ```
//!
//! 状态由 [`SceneController`](super::SceneController) 维护，场景自身只读取。
//!
//! ## 导航请求
//!
//! 场景不直接持有控制器。`goto`/`push`/`pop` 等请求先记录在 [`Navigator`] 上，
//! 控制器在当前回调返回后立即处理（构造下一个场景并调用当前场景的 `stop`）。
//! `is_scene_changing` 在请求发出后立刻为真。

use tracing::debug;

use super::fade::{FADE_SPEED, ScreenFade};
use super::kind::SceneKind;
use crate::node::SpriteNode;
use crate::sound::SoundSink;

/// 场景生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    /// 已构造，等待就绪
    #[default]
    Created,
    /// 正在运行
    Active,
    /// 已停止，但淡出或动画尚未结束
    Fading,
    /// 已停止
    Stopped,
    /// 已销毁
    Terminated,
}

/// 场景公共状态：生命周期、淡入淡出遮罩与根节点
#[derive(Debug)]
pub struct SceneBase {
    state: SceneState,
    root: SpriteNode,
    fade: ScreenFade,
    fade_speed: u32,
}

impl Default for SceneBase {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBase {
    pub fn new() -> Self {
        let root = SpriteNode::new();
        let fade = ScreenFade::new();
        root.add_child(fade.node());
        Self {
            state: SceneState::Created,
            root,
            fade,
            fade_speed: FADE_SPEED,
        }
    }

    /// 使用自定义的淡入淡出速度
    pub fn with_fade_speed(mut self, speed: u32) -> Self {
        self.fade_speed = speed.max(1);
        self
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SceneState) {
        self.state = state;
    }

    pub fn is_active(&self) -> bool {
        self.state == SceneState::Active
    }

    pub fn root(&self) -> &SpriteNode {
        &self.root
    }

    pub fn fade(&self) -> &ScreenFade {
        &self.fade
    }

    pub fn fade_speed(&self) -> u32 {
        self.fade_speed
    }

    pub fn slow_fade_speed(&self) -> u32 {
        self.fade_speed * 2
    }

    /// 淡入遮罩仍在进行时为忙
    pub fn is_busy(&self) -> bool {
        self.fade.is_fading()
    }

    pub fn start_fade_in(&mut self, duration: u32, white: bool) {
        self.fade.start_in(duration, white);
    }

    pub fn start_fade_out(&mut self, duration: u32, white: bool) {
        self.fade.start_out(duration, white);
    }

    /// 画面与音乐一起慢速淡出
    pub fn fade_out_all(&mut self, sound: &mut dyn SoundSink) {
        let frames = self.slow_fade_speed();
        sound.fade_out_music(frames);
        self.start_fade_out(frames, false);
    }

    /// 每帧的公共更新
    pub fn update(&mut self) {
        self.fade.update();
    }
}

/// 导航请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavRequest {
    Change {
        kind: SceneKind,
        /// 从栈中恢复挂起的场景，而不是新建
        resume: bool,
        /// 当前场景挂起而不是销毁
        suspend_current: bool,
    },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StackEntry {
    pub kind: SceneKind,
    pub suspended: bool,
}

/// 导航状态
///
/// 场景通过 [`SceneContext::nav`] 读取和发出请求。
#[derive(Debug, Default)]
pub struct Navigator {
    current: Option<SceneKind>,
    next: Option<SceneKind>,
    previous: Option<SceneKind>,
    stack: Vec<StackEntry>,
    reserved: bool,
    exiting: bool,
    background_source: Option<SceneKind>,
    request: Option<NavRequest>,
    clear_requested: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- 请求 ----

    /// 切换到新场景（不入栈）
    pub fn goto(&mut self, kind: SceneKind) {
        self.change(kind, false, false);
    }

    /// 把当前场景压栈后切换
    ///
    /// 当前场景若已 [`reserve_current`](Self::reserve_current)，
    /// 则挂起保留，出栈时直接恢复。
    pub fn push(&mut self, kind: SceneKind) {
        let suspend = self.reserved;
        if let Some(current) = self.current {
            self.stack.push(StackEntry {
                kind: current,
                suspended: suspend,
            });
        }
        self.change(kind, false, suspend);
    }

    /// 返回栈顶场景；栈为空时退出
    pub fn pop(&mut self) {
        match self.stack.pop() {
            Some(entry) => self.change(entry.kind, entry.suspended, false),
            None => self.exit(),
        }
    }

    /// 退出
    pub fn exit(&mut self) {
        debug!("请求退出");
        self.exiting = true;
        self.request = Some(NavRequest::Exit);
    }

    /// 清空导航栈（挂起的场景随之销毁）
    pub fn clear_stack(&mut self) {
        if !self.stack.is_empty() {
            debug!(depth = self.stack.len(), "清空场景栈");
        }
        self.stack.clear();
        self.clear_requested = true;
    }

    /// 标记当前场景在下一次 push 时挂起保留
    pub fn reserve_current(&mut self) {
        self.reserved = true;
    }

    /// 记录当前场景作为下一个场景的背景
    pub fn snap_for_background(&mut self) {
        self.background_source = self.current;
    }

    fn change(&mut self, kind: SceneKind, resume: bool, suspend_current: bool) {
        debug!(from = ?self.current, to = %kind, resume, "请求切换场景");
        self.next = Some(kind);
        self.request = Some(NavRequest::Change {
            kind,
            resume,
            suspend_current,
        });
    }

    // ---- 查询 ----

    pub fn current_scene(&self) -> Option<SceneKind> {
        self.current
    }

    pub fn next_scene(&self) -> Option<SceneKind> {
        self.next
    }

    pub fn previous_scene(&self) -> Option<SceneKind> {
        self.previous
    }

    pub fn is_next_scene(&self, kind: SceneKind) -> bool {
        self.next == Some(kind)
    }

    pub fn is_previous_scene(&self, kind: SceneKind) -> bool {
        self.previous == Some(kind)
    }

    pub fn is_scene_changing(&self) -> bool {
        self.exiting || self.next.is_some()
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// 最近一次背景快照来自哪个场景
    pub fn background_source(&self) -> Option<SceneKind> {
        self.background_source
    }

    // ---- 控制器内部 ----

    pub(crate) fn take_request(&mut self) -> Option<NavRequest> {
        self.request.take()
    }

    pub(crate) fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }

    /// 场景交接：下一个场景成为当前场景
    pub(crate) fn enter(&mut self, kind: SceneKind, previous: Option<SceneKind>) {
        self.current = Some(kind);
        self.previous = previous;
        self.reserved = false;
    }

    pub(crate) fn finish_change(&mut self) {
        self.next = None;
    }

    pub(crate) fn finish_exit(&mut self) {
        self.previous = self.current.take();
        self.next = None;
    }
}

/// 场景回调的上下文
pub struct SceneContext<'a, C> {
    /// 宿主提供的服务（游戏状态、资源、音效等）
    pub services: &'a mut C,
    pub nav: &'a mut Navigator,
}

impl<C> SceneContext<'_, C> {
    /// 全灭时切换到游戏结束
    pub fn check_gameover(&mut self, all_dead: bool) {
        if all_dead {
            self.nav.goto(SceneKind::Gameover);
        }
    }
}

/// 场景
///
/// 所有回调都有空的默认实现；`update` 默认只推进淡入淡出。
/// 覆盖 `update` 的场景应在末尾调用 `self.base_mut().update()`。
pub trait Scene<C> {
    fn kind(&self) -> SceneKind;
    fn base(&self) -> &SceneBase;
    fn base_mut(&mut self) -> &mut SceneBase;

    /// 构造完成后、开始前调用一次
    fn create(&mut self, _ctx: &mut SceneContext<'_, C>) {}

    /// 是否可以开始（资源就绪等），每帧检查直到为真
    fn is_ready(&mut self, _ctx: &mut SceneContext<'_, C>) -> bool {
        true
    }

    fn start(&mut self, _ctx: &mut SceneContext<'_, C>) {}

    fn update(&mut self, _ctx: &mut SceneContext<'_, C>) {
        self.base_mut().update();
    }

    /// 收到导航请求后调用，此时 `nav.next_scene()` 已是目标
    fn stop(&mut self, _ctx: &mut SceneContext<'_, C>) {}

    /// 为真时推迟场景切换
    fn is_busy(&self) -> bool {
        self.base().is_busy()
    }

    /// 下一个场景 `create` 之后调用
    fn terminate(&mut self, _ctx: &mut SceneContext<'_, C>) {}

    /// 挂起的场景出栈恢复时调用（代替 create/start）
    fn resume(&mut self, _ctx: &mut SceneContext<'_, C>) {}
}

/// 按种类构造场景
pub trait SceneFactory<C> {
    fn create(&mut self, kind: SceneKind, services: &mut C) -> Box<dyn Scene<C>>;
}

impl<C, F> SceneFactory<C> for F
where
    F: FnMut(SceneKind, &mut C) -> Box<dyn Scene<C>>,
{
    fn create(&mut self, kind: SceneKind, services: &mut C) -> Box<dyn Scene<C>> {
        self(kind, services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{PlayedSound, SoundLog};

    #[test]
    fn test_base_fade_speeds() {
        let base = SceneBase::new();
        assert_eq!(base.fade_speed(), 24);
        assert_eq!(base.slow_fade_speed(), 48);
        let base = SceneBase::new().with_fade_speed(10);
        assert_eq!(base.slow_fade_speed(), 20);
    }

    #[test]
    fn test_fade_out_all_requests_music_fade() {
        let mut base = SceneBase::new();
        let mut sound = SoundLog::new();
        base.fade_out_all(&mut sound);
        assert!(base.is_busy());
        assert_eq!(base.fade().duration(), 48);
        assert_eq!(sound.played(), &[PlayedSound::MusicFadeOut { frames: 48 }]);
    }

    #[test]
    fn test_push_records_current() {
        let mut nav = Navigator::new();
        nav.enter(SceneKind::Map, None);
        nav.reserve_current();
        nav.push(SceneKind::Menu);
        assert!(nav.is_scene_changing());
        assert!(nav.is_next_scene(SceneKind::Menu));
        assert_eq!(nav.stack_depth(), 1);
        assert_eq!(
            nav.take_request(),
            Some(NavRequest::Change {
                kind: SceneKind::Menu,
                resume: false,
                suspend_current: true
            })
        );
    }

    #[test]
    fn test_pop_empty_stack_exits() {
        let mut nav = Navigator::new();
        nav.enter(SceneKind::Title, None);
        nav.pop();
        assert!(nav.is_exiting());
        assert_eq!(nav.take_request(), Some(NavRequest::Exit));
    }

    #[test]
    fn test_snap_for_background() {
        let mut nav = Navigator::new();
        nav.enter(SceneKind::Map, Some(SceneKind::Battle));
        assert!(nav.is_previous_scene(SceneKind::Battle));
        nav.snap_for_background();
        assert_eq!(nav.background_source(), Some(SceneKind::Map));
    }

    #[test]
    fn test_check_gameover() {
        let mut nav = Navigator::new();
        let mut services = ();
        let mut ctx = SceneContext {
            services: &mut services,
            nav: &mut nav,
        };
        ctx.check_gameover(false);
        assert!(!ctx.nav.is_scene_changing());
        ctx.check_gameover(true);
        assert!(ctx.nav.is_next_scene(SceneKind::Gameover));
    }
}
