use ratatui::prelude::*;

use crate::app::App;

use super::detail_panel;
use super::failure_list;
use super::notifications;
use super::search_box;
use super::status_bar;
use super::test_list;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .areas(main_area);

    let [list_area, failed_area] =
        Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)]).areas(left_area);

    if app.filter_active || !app.filter.value().is_empty() {
        let [search_area, filtered_list_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(list_area);
        search_box::draw(frame, app.filter.value(), app.filter_active, search_area);
        test_list::draw(frame, app, filtered_list_area);
    } else {
        test_list::draw(frame, app, list_area);
    }
    failure_list::draw(frame, app, failed_area);
    detail_panel::draw(frame, app, right_area);
    status_bar::draw(frame, app, status_area);
    notifications::draw(frame, app);
}
