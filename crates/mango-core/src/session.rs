//! Session state tying the flows to the dispatcher.
//!
//! The session owns the list view, at most one detail view and at most one
//! add/edit form. Each submitted call is recorded against the flow instance
//! that issued it; replies for instances that have since closed are dropped.

use crate::client::{ApiCall, ApiReply, CredentialClient};
use crate::dispatch::{Completion, Dispatcher, Execution, Ticket};
use crate::flows::edit::SaveOutcome;
use crate::flows::{Activation, DetailFlow, EditFlow, EditMode, FlowId, ListView, SiteSearch};
use crate::models::{Field, Notice};
use crate::transport::Transport;
use std::collections::{HashMap, VecDeque};

/// Which flow a submitted call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    List,
    Detail(FlowId),
    Editor(FlowId),
}

pub struct Session<T> {
    dispatcher: Dispatcher<T>,
    owners: HashMap<Ticket, Owner>,
    list: ListView,
    search: Option<SiteSearch>,
    detail: Option<DetailFlow>,
    editor: Option<EditFlow>,
    notices: VecDeque<Notice>,
    next_flow: u64,
    /// Newest list call whose reply has been applied.
    list_applied: Option<Ticket>,
}

impl<T: Transport + 'static> Session<T> {
    pub fn new(client: CredentialClient<T>, execution: Execution) -> Self {
        Self {
            dispatcher: Dispatcher::new(client, execution),
            owners: HashMap::new(),
            list: ListView::new(),
            search: None,
            detail: None,
            editor: None,
            notices: VecDeque::new(),
            next_flow: 0,
            list_applied: None,
        }
    }

    pub fn client(&self) -> &CredentialClient<T> {
        self.dispatcher.client()
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListView {
        &mut self.list
    }

    pub fn detail(&self) -> Option<&DetailFlow> {
        self.detail.as_ref()
    }

    pub fn editor(&self) -> Option<&EditFlow> {
        self.editor.as_ref()
    }

    pub fn search(&self) -> Option<&SiteSearch> {
        self.search.as_ref()
    }

    /// Whether any request is still awaiting its reply.
    pub fn is_busy(&self) -> bool {
        self.dispatcher.in_flight() > 0
    }

    // --- Notices ---

    /// The oldest notice not yet dismissed.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    fn notify(&mut self, notice: Notice) {
        tracing::debug!("Notice: {} - {}", notice.title, notice.message);
        self.notices.push_back(notice);
    }

    // --- List ---

    /// Refetch the site list.
    pub fn refresh(&mut self) {
        self.submit(ApiCall::List, Owner::List);
    }

    /// Open the detail view for the selected site.
    pub fn open_selected(&mut self) {
        match self.list.activate() {
            Activation::Open(site) => self.open_detail(site),
            Activation::Rejected(notice) => self.notify(notice),
        }
    }

    fn open_detail(&mut self, site: String) {
        let id = self.next_flow_id();
        let detail = DetailFlow::new(id, site);
        let call = detail.fetch_call();
        tracing::debug!("Opening details for {}", detail.site());
        self.detail = Some(detail);
        self.submit(call, Owner::Detail(id));
    }

    // --- Search ---

    pub fn open_search(&mut self) {
        self.search = Some(SiteSearch::new());
    }

    pub fn close_search(&mut self) {
        self.search = None;
    }

    pub fn search_push(&mut self, c: char) {
        if let Some(search) = self.search.as_mut() {
            search.push_char(c, self.list.sites());
        }
    }

    pub fn search_pop(&mut self) {
        if let Some(search) = self.search.as_mut() {
            search.pop_char(self.list.sites());
        }
    }

    pub fn search_up(&mut self) {
        if let Some(search) = self.search.as_mut() {
            search.move_up();
        }
    }

    pub fn search_down(&mut self) {
        if let Some(search) = self.search.as_mut() {
            search.move_down();
        }
    }

    /// Select the highlighted hit in the list and close the overlay.
    pub fn choose_search_hit(&mut self) {
        let Some(search) = self.search.take() else {
            return;
        };
        if let Some(site) = search.selected_site() {
            self.list.select_site(site);
        }
    }

    // --- Add/edit ---

    /// Open an empty form for a new credential.
    pub fn open_add(&mut self) {
        let id = self.next_flow_id();
        self.editor = Some(EditFlow::new(id, EditMode::Add));
    }

    /// Open the form in edit mode for the credential in the detail view.
    pub fn open_update(&mut self) {
        let Some(detail) = self.detail.as_ref().filter(|d| d.accepts_actions()) else {
            return;
        };
        let site = detail.site().to_string();
        let id = self.next_flow_id();
        self.editor = Some(EditFlow::new(id, EditMode::Edit(site)));
    }

    /// Close the form without saving. A save in flight is not cancelled.
    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    pub fn edit_push(&mut self, field: Field, c: char) {
        if let Some(editor) = self.editor.as_mut() {
            editor.push_char(field, c);
        }
    }

    pub fn edit_pop(&mut self, field: Field) {
        if let Some(editor) = self.editor.as_mut() {
            editor.pop_char(field);
        }
    }

    pub fn edit_set(&mut self, field: Field, value: impl Into<String>) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set(field, value);
        }
    }

    /// Validate the form and issue create or update.
    pub fn submit_editor(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let id = editor.id();
        match editor.submit() {
            Ok(Some(call)) => self.submit(call, Owner::Editor(id)),
            Ok(None) => {}
            Err(e) => self.notify(Notice::warning("Input Error", e.reason)),
        }
    }

    // --- Detail ---

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn toggle_password(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            detail.toggle_password();
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            detail.request_delete();
        }
    }

    /// Answer the detail view's pending yes/no question.
    pub fn answer(&mut self, accepted: bool) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        let id = detail.id();
        if let Some(call) = detail.answer(accepted) {
            self.submit(call, Owner::Detail(id));
        }
    }

    // --- Completions ---

    /// Route every finished call to its flow. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(completion) = self.dispatcher.try_next() {
            self.route(completion);
            handled += 1;
        }
        handled
    }

    fn route(&mut self, completion: Completion) {
        let ticket = completion.ticket;
        let Some(owner) = self.owners.remove(&ticket) else {
            tracing::warn!("Completion for unknown {:?}", ticket);
            return;
        };

        match (owner, completion.reply) {
            (Owner::List, ApiReply::Sites(result)) => {
                // Tickets grow with each call; a reply that finishes after a
                // newer one was applied describes an older server state.
                if self.list_applied.is_some_and(|applied| applied > ticket) {
                    tracing::debug!("Dropping stale site list {:?}", ticket);
                    return;
                }
                self.list_applied = Some(ticket);
                if let Some(notice) = self.list.apply(result) {
                    self.notify(notice);
                }
            }
            (Owner::Detail(id), ApiReply::Credential(result)) => {
                let Some(detail) = self.detail.as_mut().filter(|d| d.id() == id) else {
                    tracing::debug!("Dropping details for closed view {:?}", id);
                    return;
                };
                if let Err(notice) = detail.on_fetched(result) {
                    self.detail = None;
                    self.notify(notice);
                }
            }
            (Owner::Detail(id), ApiReply::Deleted(result)) => {
                let Some(detail) = self.detail.as_mut().filter(|d| d.id() == id) else {
                    tracing::debug!("Dropping delete reply for closed view {:?}", id);
                    return;
                };
                match detail.on_deleted(result) {
                    Ok(()) => {
                        self.detail = None;
                        self.refresh();
                    }
                    Err(notice) => self.notify(notice),
                }
            }
            (Owner::Editor(id), ApiReply::Saved(result)) => {
                let Some(editor) = self.editor.as_mut().filter(|e| e.id() == id) else {
                    tracing::debug!("Dropping save reply for closed form {:?}", id);
                    return;
                };
                match editor.on_saved(result) {
                    SaveOutcome::Accepted(notice) => {
                        let edited = matches!(editor.mode(), EditMode::Edit(_));
                        self.editor = None;
                        // An update is launched from the detail view, which
                        // closes along with the form.
                        if edited {
                            self.detail = None;
                        }
                        self.notify(notice);
                        self.refresh();
                    }
                    SaveOutcome::Retained(notice) => self.notify(notice),
                }
            }
            (owner, reply) => {
                tracing::warn!("Unexpected reply {:?} for {:?}", reply, owner);
            }
        }
    }

    fn submit(&mut self, call: ApiCall, owner: Owner) {
        let ticket = self.dispatcher.submit(call);
        self.owners.insert(ticket, owner);
    }

    fn next_flow_id(&mut self) -> FlowId {
        self.next_flow += 1;
        FlowId(self.next_flow)
    }
}
