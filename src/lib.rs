pub mod commands;
pub mod state;
pub mod users;

use std::sync::Mutex;

use tauri::Manager;

use state::AppStateManager;

// ============================================================================
// App Entry Point
// ============================================================================

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log::LevelFilter::Info)
                .level_for("supply_sdk", log::LevelFilter::Debug)
                .level_for("hyper", log::LevelFilter::Warn)
                .level_for("hyper_util", log::LevelFilter::Warn)
                .level_for("reqwest", log::LevelFilter::Warn)
                .level_for("alloy_transport_http", log::LevelFilter::Warn)
                .level_for("tao", log::LevelFilter::Warn)
                .build(),
        )
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir()?;
            let manager = AppStateManager::new(app_data_dir);
            match manager.current_user() {
                Some(user) => log::info!("signing as {} ({})", user.name, user.address()),
                None => log::warn!("no local users available; submissions are disabled"),
            }
            app.manage(Mutex::new(manager));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Form
            commands::list_document_types,
            commands::new_contract_draft,
            commands::add_draft_document,
            commands::remove_draft_document,
            commands::validate_contract_draft,
            // Users
            commands::get_app_state,
            commands::list_users,
            commands::get_current_user,
            commands::set_current_user,
            // Chain
            commands::get_chain_config,
            commands::set_chain_config,
            commands::create_contract_onchain,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
