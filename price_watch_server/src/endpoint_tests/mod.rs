mod cron;
mod helpers;
mod products;
