use async_trait::async_trait;
use mongodb::Database as MongoDb;

use crate::campaign::db::MongoCampaignStore;
use crate::campaign::{Campaign, CampaignId, CampaignStatus};
use crate::candidate::db::MongoCandidateStore;
use crate::candidate::{Candidate, CandidateId};
use crate::email_list::db::MongoEmailListStore;
use crate::email_list::{EmailList, EmailListId};
use crate::error::Error;
use crate::recipient::db::MongoRecipientStore;
use crate::recipient::{DeliveryState, Recipient, RecipientId, TrackingToken};
use crate::template::db::MongoTemplateStore;
use crate::template::{EmailTemplate, TemplateId};
use crate::{campaign, candidate, email_list, recipient, template};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;
    async fn fetch_campaign_by_id(&self, campaign_id: CampaignId)
        -> Result<Option<Campaign>, Error>;
    /// Optimistic update keyed on `modified_at`; a lost race surfaces
    /// `ConcurrentModificationDetected`.
    async fn update_campaign_status(
        &self,
        campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error>;
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error>;
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), Error>;
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, Error>;
    async fn fetch_candidate_by_id(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Option<Candidate>, Error>;
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert_template(&self, template: &EmailTemplate) -> Result<(), Error>;
    async fn fetch_templates(&self) -> Result<Vec<EmailTemplate>, Error>;
    async fn fetch_template_by_id(
        &self,
        template_id: TemplateId,
    ) -> Result<Option<EmailTemplate>, Error>;
}

#[async_trait]
pub trait EmailListStore: Send + Sync {
    async fn insert_email_list(&self, email_list: &EmailList) -> Result<(), Error>;
    async fn fetch_email_lists(&self) -> Result<Vec<EmailList>, Error>;
    async fn fetch_email_list_by_id(
        &self,
        email_list_id: EmailListId,
    ) -> Result<Option<EmailList>, Error>;
}

/// The recipient ledger. Every state transition is a single durable write,
/// guarded against concurrent writers by matching `modified_at`.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    async fn insert_recipient(&self, recipient: &Recipient) -> Result<(), Error>;
    async fn fetch_recipients_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Recipient>, Error>;
    async fn fetch_recipients_by_campaign_and_states(
        &self,
        campaign_id: CampaignId,
        states: &[DeliveryState],
    ) -> Result<Vec<Recipient>, Error>;
    async fn fetch_recipient_by_id(
        &self,
        recipient_id: RecipientId,
    ) -> Result<Option<Recipient>, Error>;
    async fn fetch_recipient_by_token(
        &self,
        token: TrackingToken,
    ) -> Result<Option<Recipient>, Error>;
    /// Moves the record to `state`, stamping `received_at` when entering
    /// `Received`.
    async fn update_recipient_state(
        &self,
        recipient: Recipient,
        state: DeliveryState,
    ) -> Result<Recipient, Error>;
    /// Moves the record to `Sent`, stamping `sent_at` and the transport's
    /// message id.
    async fn update_recipient_sent(
        &self,
        recipient: Recipient,
        message_id: Option<String>,
    ) -> Result<Recipient, Error>;
    /// Moves the record to `Failed`, persisting the failure reason.
    async fn update_recipient_failed(
        &self,
        recipient: Recipient,
        reason: String,
    ) -> Result<Recipient, Error>;
    async fn update_recipient_content(
        &self,
        recipient: Recipient,
        display_name: Option<String>,
        subject: String,
        body: String,
    ) -> Result<Recipient, Error>;
    async fn delete_recipients_by_campaign(&self, campaign_id: CampaignId) -> Result<(), Error>;
}

#[async_trait]
pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;
    fn candidates(&self) -> &dyn CandidateStore;
    fn templates(&self) -> &dyn TemplateStore;
    fn email_lists(&self) -> &dyn EmailListStore;
    fn recipients(&self) -> &dyn RecipientStore;
    async fn drop(&self) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
    candidates: MongoCandidateStore,
    templates: MongoTemplateStore,
    email_lists: MongoEmailListStore,
    recipients: MongoRecipientStore,
    db: MongoDb,
}

impl MongoDatabase {
    pub async fn initialize(db: MongoDb) -> Result<MongoDatabase, Error> {
        campaign::db::initialize(&db).await?;
        candidate::db::initialize(&db).await?;
        template::db::initialize(&db).await?;
        email_list::db::initialize(&db).await?;
        recipient::db::initialize(&db).await?;

        Ok(MongoDatabase {
            campaigns: MongoCampaignStore::new(&db),
            candidates: MongoCandidateStore::new(&db),
            templates: MongoTemplateStore::new(&db),
            email_lists: MongoEmailListStore::new(&db),
            recipients: MongoRecipientStore::new(&db),
            db,
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn candidates(&self) -> &dyn CandidateStore {
        &self.candidates
    }

    fn templates(&self) -> &dyn TemplateStore {
        &self.templates
    }

    fn email_lists(&self) -> &dyn EmailListStore {
        &self.email_lists
    }

    fn recipients(&self) -> &dyn RecipientStore {
        &self.recipients
    }

    async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;
        Ok(())
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    type Hook<In, Out> = Box<dyn Fn(In) -> Result<Out, Error> + Send + Sync>;

    fn unmocked<In, Out>(name: &'static str) -> Hook<In, Out> {
        Box::new(move |_| panic!("unexpected call to {}", name))
    }

    /// Closure-hook database for manager tests; every operation panics until
    /// a test installs a hook for it.
    pub struct MockDatabase {
        pub campaigns: MockCampaignStore,
        pub candidates: MockCandidateStore,
        pub templates: MockTemplateStore,
        pub email_lists: MockEmailListStore,
        pub recipients: MockRecipientStore,
    }

    impl MockDatabase {
        pub fn new() -> MockDatabase {
            MockDatabase {
                campaigns: MockCampaignStore::new(),
                candidates: MockCandidateStore::new(),
                templates: MockTemplateStore::new(),
                email_lists: MockEmailListStore::new(),
                recipients: MockRecipientStore::new(),
            }
        }
    }

    #[async_trait]
    impl Database for MockDatabase {
        fn campaigns(&self) -> &dyn CampaignStore {
            &self.campaigns
        }

        fn candidates(&self) -> &dyn CandidateStore {
            &self.candidates
        }

        fn templates(&self) -> &dyn TemplateStore {
            &self.templates
        }

        fn email_lists(&self) -> &dyn EmailListStore {
            &self.email_lists
        }

        fn recipients(&self) -> &dyn RecipientStore {
            &self.recipients
        }

        async fn drop(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    pub struct MockCampaignStore {
        pub on_insert_campaign: Hook<Campaign, ()>,
        pub on_fetch_campaigns: Hook<(), Vec<Campaign>>,
        pub on_fetch_campaign_by_id: Hook<CampaignId, Option<Campaign>>,
        pub on_update_campaign_status: Hook<(Campaign, CampaignStatus), Campaign>,
        pub on_delete_campaign: Hook<CampaignId, ()>,
    }

    impl MockCampaignStore {
        fn new() -> MockCampaignStore {
            MockCampaignStore {
                on_insert_campaign: unmocked("insert_campaign"),
                on_fetch_campaigns: unmocked("fetch_campaigns"),
                on_fetch_campaign_by_id: unmocked("fetch_campaign_by_id"),
                on_update_campaign_status: unmocked("update_campaign_status"),
                on_delete_campaign: unmocked("delete_campaign"),
            }
        }
    }

    #[async_trait]
    impl CampaignStore for MockCampaignStore {
        async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
            (self.on_insert_campaign)(campaign.clone())
        }

        async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
            (self.on_fetch_campaigns)(())
        }

        async fn fetch_campaign_by_id(
            &self,
            campaign_id: CampaignId,
        ) -> Result<Option<Campaign>, Error> {
            (self.on_fetch_campaign_by_id)(campaign_id)
        }

        async fn update_campaign_status(
            &self,
            campaign: Campaign,
            status: CampaignStatus,
        ) -> Result<Campaign, Error> {
            (self.on_update_campaign_status)((campaign, status))
        }

        async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
            (self.on_delete_campaign)(campaign_id)
        }
    }

    pub struct MockCandidateStore {
        pub on_insert_candidate: Hook<Candidate, ()>,
        pub on_fetch_candidates: Hook<(), Vec<Candidate>>,
        pub on_fetch_candidate_by_id: Hook<CandidateId, Option<Candidate>>,
    }

    impl MockCandidateStore {
        fn new() -> MockCandidateStore {
            MockCandidateStore {
                on_insert_candidate: unmocked("insert_candidate"),
                on_fetch_candidates: unmocked("fetch_candidates"),
                on_fetch_candidate_by_id: unmocked("fetch_candidate_by_id"),
            }
        }
    }

    #[async_trait]
    impl CandidateStore for MockCandidateStore {
        async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), Error> {
            (self.on_insert_candidate)(candidate.clone())
        }

        async fn fetch_candidates(&self) -> Result<Vec<Candidate>, Error> {
            (self.on_fetch_candidates)(())
        }

        async fn fetch_candidate_by_id(
            &self,
            candidate_id: CandidateId,
        ) -> Result<Option<Candidate>, Error> {
            (self.on_fetch_candidate_by_id)(candidate_id)
        }
    }

    pub struct MockTemplateStore {
        pub on_insert_template: Hook<EmailTemplate, ()>,
        pub on_fetch_templates: Hook<(), Vec<EmailTemplate>>,
        pub on_fetch_template_by_id: Hook<TemplateId, Option<EmailTemplate>>,
    }

    impl MockTemplateStore {
        fn new() -> MockTemplateStore {
            MockTemplateStore {
                on_insert_template: unmocked("insert_template"),
                on_fetch_templates: unmocked("fetch_templates"),
                on_fetch_template_by_id: unmocked("fetch_template_by_id"),
            }
        }
    }

    #[async_trait]
    impl TemplateStore for MockTemplateStore {
        async fn insert_template(&self, template: &EmailTemplate) -> Result<(), Error> {
            (self.on_insert_template)(template.clone())
        }

        async fn fetch_templates(&self) -> Result<Vec<EmailTemplate>, Error> {
            (self.on_fetch_templates)(())
        }

        async fn fetch_template_by_id(
            &self,
            template_id: TemplateId,
        ) -> Result<Option<EmailTemplate>, Error> {
            (self.on_fetch_template_by_id)(template_id)
        }
    }

    pub struct MockEmailListStore {
        pub on_insert_email_list: Hook<EmailList, ()>,
        pub on_fetch_email_lists: Hook<(), Vec<EmailList>>,
        pub on_fetch_email_list_by_id: Hook<EmailListId, Option<EmailList>>,
    }

    impl MockEmailListStore {
        fn new() -> MockEmailListStore {
            MockEmailListStore {
                on_insert_email_list: unmocked("insert_email_list"),
                on_fetch_email_lists: unmocked("fetch_email_lists"),
                on_fetch_email_list_by_id: unmocked("fetch_email_list_by_id"),
            }
        }
    }

    #[async_trait]
    impl EmailListStore for MockEmailListStore {
        async fn insert_email_list(&self, email_list: &EmailList) -> Result<(), Error> {
            (self.on_insert_email_list)(email_list.clone())
        }

        async fn fetch_email_lists(&self) -> Result<Vec<EmailList>, Error> {
            (self.on_fetch_email_lists)(())
        }

        async fn fetch_email_list_by_id(
            &self,
            email_list_id: EmailListId,
        ) -> Result<Option<EmailList>, Error> {
            (self.on_fetch_email_list_by_id)(email_list_id)
        }
    }

    pub struct MockRecipientStore {
        pub on_insert_recipient: Hook<Recipient, ()>,
        pub on_fetch_recipients_by_campaign: Hook<CampaignId, Vec<Recipient>>,
        pub on_fetch_recipients_by_campaign_and_states:
            Hook<(CampaignId, Vec<DeliveryState>), Vec<Recipient>>,
        pub on_fetch_recipient_by_id: Hook<RecipientId, Option<Recipient>>,
        pub on_fetch_recipient_by_token: Hook<TrackingToken, Option<Recipient>>,
        pub on_update_recipient_state: Hook<(Recipient, DeliveryState), Recipient>,
        pub on_update_recipient_sent: Hook<(Recipient, Option<String>), Recipient>,
        pub on_update_recipient_failed: Hook<(Recipient, String), Recipient>,
        pub on_update_recipient_content:
            Hook<(Recipient, Option<String>, String, String), Recipient>,
        pub on_delete_recipients_by_campaign: Hook<CampaignId, ()>,
    }

    impl MockRecipientStore {
        fn new() -> MockRecipientStore {
            MockRecipientStore {
                on_insert_recipient: unmocked("insert_recipient"),
                on_fetch_recipients_by_campaign: unmocked("fetch_recipients_by_campaign"),
                on_fetch_recipients_by_campaign_and_states: unmocked(
                    "fetch_recipients_by_campaign_and_states",
                ),
                on_fetch_recipient_by_id: unmocked("fetch_recipient_by_id"),
                on_fetch_recipient_by_token: unmocked("fetch_recipient_by_token"),
                on_update_recipient_state: unmocked("update_recipient_state"),
                on_update_recipient_sent: unmocked("update_recipient_sent"),
                on_update_recipient_failed: unmocked("update_recipient_failed"),
                on_update_recipient_content: unmocked("update_recipient_content"),
                on_delete_recipients_by_campaign: unmocked("delete_recipients_by_campaign"),
            }
        }
    }

    #[async_trait]
    impl RecipientStore for MockRecipientStore {
        async fn insert_recipient(&self, recipient: &Recipient) -> Result<(), Error> {
            (self.on_insert_recipient)(recipient.clone())
        }

        async fn fetch_recipients_by_campaign(
            &self,
            campaign_id: CampaignId,
        ) -> Result<Vec<Recipient>, Error> {
            (self.on_fetch_recipients_by_campaign)(campaign_id)
        }

        async fn fetch_recipients_by_campaign_and_states(
            &self,
            campaign_id: CampaignId,
            states: &[DeliveryState],
        ) -> Result<Vec<Recipient>, Error> {
            (self.on_fetch_recipients_by_campaign_and_states)((campaign_id, states.to_vec()))
        }

        async fn fetch_recipient_by_id(
            &self,
            recipient_id: RecipientId,
        ) -> Result<Option<Recipient>, Error> {
            (self.on_fetch_recipient_by_id)(recipient_id)
        }

        async fn fetch_recipient_by_token(
            &self,
            token: TrackingToken,
        ) -> Result<Option<Recipient>, Error> {
            (self.on_fetch_recipient_by_token)(token)
        }

        async fn update_recipient_state(
            &self,
            recipient: Recipient,
            state: DeliveryState,
        ) -> Result<Recipient, Error> {
            (self.on_update_recipient_state)((recipient, state))
        }

        async fn update_recipient_sent(
            &self,
            recipient: Recipient,
            message_id: Option<String>,
        ) -> Result<Recipient, Error> {
            (self.on_update_recipient_sent)((recipient, message_id))
        }

        async fn update_recipient_failed(
            &self,
            recipient: Recipient,
            reason: String,
        ) -> Result<Recipient, Error> {
            (self.on_update_recipient_failed)((recipient, reason))
        }

        async fn update_recipient_content(
            &self,
            recipient: Recipient,
            display_name: Option<String>,
            subject: String,
            body: String,
        ) -> Result<Recipient, Error> {
            (self.on_update_recipient_content)((recipient, display_name, subject, body))
        }

        async fn delete_recipients_by_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
            (self.on_delete_recipients_by_campaign)(campaign_id)
        }
    }
}
