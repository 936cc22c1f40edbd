//! # 战斗流程集成测试
//!
//! 测试 地图遇敌 → 战斗 → 战斗结束 的完整链路，
//! 战斗画面在其中驱动战斗者表现与动画。

use stage_host::scenes::{BATTLE_BGM, BATTLE_START_SE, MAP_BGM};
use stage_host::{AppConfig, InputManager, StageApp};
use stage_runtime::{Battler, SceneKind};
use tempfile::TempDir;

fn test_app(commands: &[&str], auto_play: bool, battle_test: bool) -> (StageApp, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        assets_root: dir.path().to_path_buf(),
        battle_test,
        ..Default::default()
    };
    let input = InputManager::from_entries(commands).unwrap();
    let app = StageApp::new(&config, input, auto_play).unwrap();
    (app, dir)
}

fn scenes(app: &StageApp) -> Vec<SceneKind> {
    app.trace().iter().map(|t| t.scene).collect()
}

#[test]
fn test_encounter_effect_precedes_battle() {
    let (mut app, _dir) = test_app(&["3:new_game", "120:encounter"], false, false);

    assert!(app.run_until(SceneKind::Map, 300).unwrap());
    // 遇敌指令到达后，地图先播放 60 帧的遇敌效果
    while !app.controller().is_scene_changing() {
        app.tick().unwrap();
        assert!(app.frame() < 300);
    }
    let encounter_frame = app.frame();
    assert!(app.services().game.battle().is_some());
    assert_eq!(app.services().audio.count_se(BATTLE_START_SE), 1);

    assert!(app.run_until(SceneKind::Battle, 200).unwrap());
    assert!(app.frame() - encounter_frame >= 60);

    let services = app.services();
    assert_eq!(
        app.controller().navigator().background_source(),
        Some(SceneKind::Map)
    );
    assert_eq!(services.audio.current_bgm(), Some(BATTLE_BGM));
    // 地图销毁时清除缩放
    assert_eq!(services.game.screen.state().zoom.scale, 1.0);
}

#[test]
fn test_victory_returns_to_map_with_fade_in() {
    let (mut app, _dir) = test_app(&[], true, false);

    assert!(app.run_until(SceneKind::Battle, 600).unwrap());
    assert!(app.run_until(SceneKind::Map, 5000).unwrap());

    let controller = app.controller();
    assert!(controller.navigator().is_previous_scene(SceneKind::Battle));
    assert!(controller.current().unwrap().base().fade().is_fading());

    let services = app.services();
    assert_eq!(services.game.battles_fought(), 1);
    assert!(services.game.battle().is_none());
    assert_eq!(services.audio.current_bgm(), Some(MAP_BGM));
    assert!(services.game.party().iter().all(|b| b.borrow().is_alive()));
    // 普通攻击动画的音效
    assert!(services.audio.count_se("Blow1") > 0);
    assert_eq!(
        scenes(&app),
        vec![
            SceneKind::Boot,
            SceneKind::Title,
            SceneKind::Map,
            SceneKind::Battle,
            SceneKind::Map,
        ]
    );
}

#[test]
fn test_battle_waits_for_commands() {
    let (mut app, _dir) = test_app(&[], false, true);

    assert!(app.run_until(SceneKind::Battle, 10).unwrap());
    app.run(300).unwrap();

    let battle = app.services().game.battle().unwrap();
    assert_eq!(battle.turn(), 1);
    assert!(stage_runtime::BattleStatus::is_inputting(battle));
}

#[test]
fn test_battle_test_exits_after_victory() {
    let (mut app, _dir) = test_app(&[], true, true);

    let frames = app.run(5000).unwrap();
    assert!(app.is_exited());
    assert!(frames < 5000);
    assert_eq!(scenes(&app), vec![SceneKind::Boot, SceneKind::Battle]);
    assert!(app.services().game.battle().is_none());
}

#[test]
fn test_defeat_leads_to_gameover_then_title() {
    let (mut app, _dir) = test_app(&[], true, true);

    assert!(app.run_until(SceneKind::Battle, 10).unwrap());
    // 我方只剩 1 HP
    for member in app.services().game.party() {
        let hp = member.borrow().hp();
        member.borrow_mut().take_damage(hp - 1, false);
    }

    assert!(app.run_until(SceneKind::Gameover, 5000).unwrap());
    assert!(app.services().game.is_party_all_dead());
    assert_eq!(
        app.services().audio.current_me(),
        Some(stage_host::scenes::GAMEOVER_ME)
    );

    assert!(app.run_until(SceneKind::Title, 1000).unwrap());
    assert_eq!(
        scenes(&app),
        vec![
            SceneKind::Boot,
            SceneKind::Battle,
            SceneKind::Gameover,
            SceneKind::Title,
        ]
    );
}

#[test]
fn test_gameover_me_survives_battle_teardown() {
    let (mut app, _dir) = test_app(&[], true, true);

    assert!(app.run_until(SceneKind::Battle, 10).unwrap());
    for member in app.services().game.party() {
        let hp = member.borrow().hp();
        member.borrow_mut().take_damage(hp - 1, false);
    }

    // 战斗场景在游戏结束场景 create 之后销毁，不能停掉刚开始的 ME
    while app.current_kind() != Some(SceneKind::Gameover) {
        app.tick().unwrap();
        assert!(app.frame() < 5000);
    }
    assert!(app.services().game.battle().is_none());
    assert_eq!(
        app.services().audio.current_me(),
        Some(stage_host::scenes::GAMEOVER_ME)
    );
}
